//! 判定结果与定位结果（对外暴露）
use serde::Serialize;

/// 单次 oracle 查询的三值判定
/// - Malicious：引擎报告检出
/// - Clean：引擎报告未检出
/// - Indeterminate：超时、进程启动失败或未知退出码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Malicious,
    Clean,
    Indeterminate,
}

/// 一次查询记录：前缀长度 + 判定（含重试）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub prefix_len: usize,
    pub verdict: Verdict,
}

/// 二分搜索的最终输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// 最小恶意前缀长度：[0, threshold) 触发检出，[0, threshold-1) 不触发
    pub threshold: usize,
    /// 实际发出的 oracle 调用次数
    pub queries: usize,
    /// 按发出顺序排列的查询轨迹
    pub probes: Vec<Probe>,
}

/// 定位区域：阈值 + 以阈值结尾的展示窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedRegion {
    pub threshold: usize,
    /// 窗口在原文件中的起始偏移（已向 0 截断）
    pub window_start: usize,
    pub window: Vec<u8>,
}

impl LocalizedRegion {
    /// 从原缓冲区切出 `[max(0, threshold - window), threshold)`
    pub fn from_buffer(buf: &[u8], threshold: usize, window: usize) -> Self {
        let range = crate::report::display_window(buf.len(), threshold, window);
        Self { threshold, window_start: range.start, window: buf[range].to_vec() }
    }
}
