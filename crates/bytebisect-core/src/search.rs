//! 二分搜索引擎：在前缀长度上定位“干净 → 恶意”的转折点
//!
//! 不变量：
//! - `low < high`；`high` 为已知恶意的最短前缀，`low` 为假定/已知干净的最长前缀。
//! - 入口前提：整个缓冲区已判定为恶意（`high = N` 成立）。
//! - 单调性假设仅在结束时于前缀长度 0 处校验一次，总调用数为 ceil(log2 N) + 1（不含重试）。
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::SearchError;
use crate::oracle::Oracle;
use crate::options::SearchOptions;
use crate::verdict::{Probe, SearchOutcome, Verdict};

/// 在 `buf` 上二分定位最小恶意前缀长度
/// - `cancel` 在每次查询前检查，置位后以 `Cancelled` 结束
/// - 同一前缀长度的 Indeterminate 最多重试 `max_retries` 次，仍失败则 `OracleUnavailable`
pub fn bisect<O: Oracle + ?Sized>(
    buf: &[u8],
    oracle: &mut O,
    opts: &SearchOptions,
    cancel: Option<&AtomicBool>,
) -> Result<SearchOutcome, SearchError> {
    let n = buf.len();
    if n == 0 {
        return Ok(SearchOutcome { threshold: 0, queries: 0, probes: Vec::new() });
    }

    let mut run = Bisector { buf, oracle, opts, cancel, probes: Vec::new() };
    let (mut low, mut high) = (0usize, n);

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if run.is_malicious(mid)? {
            high = mid;
        } else {
            low = mid;
        }
        debug!(low, high, "bounds updated");
    }

    // 单调性校验：空前缀必须干净，除非从未观察到任何干净前缀（即阈值为 0）
    let threshold = match (run.is_malicious(0)?, low) {
        (false, _) => high,
        (true, 0) => 0,
        (true, clean_at) => return Err(SearchError::NonMonotonic { clean_at }),
    };

    info!(threshold, queries = run.probes.len(), "bisection converged");
    Ok(SearchOutcome { threshold, queries: run.probes.len(), probes: run.probes })
}

struct Bisector<'a, O: ?Sized> {
    buf: &'a [u8],
    oracle: &'a mut O,
    opts: &'a SearchOptions,
    cancel: Option<&'a AtomicBool>,
    probes: Vec<Probe>,
}

impl<O: Oracle + ?Sized> Bisector<'_, O> {
    /// 查询长度为 `len` 的前缀，只返回严格判定
    fn is_malicious(&mut self, len: usize) -> Result<bool, SearchError> {
        let attempts = self.opts.max_retries + 1;
        for attempt in 1..=attempts {
            if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(SearchError::Cancelled { queries: self.probes.len() });
            }
            let verdict = self.oracle.classify(&self.buf[..len]);
            self.probes.push(Probe { prefix_len: len, verdict });
            match verdict {
                Verdict::Malicious => return Ok(true),
                Verdict::Clean => return Ok(false),
                Verdict::Indeterminate => debug!(prefix_len = len, attempt, "indeterminate verdict"),
            }
        }
        Err(SearchError::OracleUnavailable { prefix_len: len, attempts })
    }
}
