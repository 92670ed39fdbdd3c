//! Oracle 适配层：把“外部引擎扫描一个字节序列”封装为三值判定
//!
//! 设计要点：
//! - 每次查询写一个唯一命名的临时文件，查询结束（含超时、启动失败）后一定删除。
//! - 进程同步等待并强制超时；超时后先 kill 再回收。
//! - 原始退出码不越过本模块边界，只向外暴露 `Verdict`。
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::AnalyzeError;
use crate::options::{EngineProfile, FILE_PLACEHOLDER};
use crate::verdict::Verdict;

/// 临时文件名前缀
const SCRATCH_PREFIX: &str = "scanme-";

/// 对字节序列给出判定的黑盒
pub trait Oracle {
    fn classify(&mut self, bytes: &[u8]) -> Verdict;
}

/// 任意闭包都可作为 oracle（测试与进程内引擎使用）
impl<F> Oracle for F
where
    F: FnMut(&[u8]) -> Verdict,
{
    fn classify(&mut self, bytes: &[u8]) -> Verdict {
        self(bytes)
    }
}

/// 退出码 → 判定（进程被信号终止时没有退出码，视为 Indeterminate）
pub fn verdict_for_exit(code: Option<i32>, profile: &EngineProfile) -> Verdict {
    match code {
        Some(c) if profile.clean_exit_codes.contains(&c) => Verdict::Clean,
        Some(c) if profile.malicious_exit_codes.contains(&c) => Verdict::Malicious,
        _ => Verdict::Indeterminate,
    }
}

/// 调用外部检测引擎的 oracle
pub struct EngineOracle {
    engine: PathBuf,
    profile: EngineProfile,
    scratch_dir: PathBuf,
}

impl EngineOracle {
    pub fn new(engine: PathBuf, profile: EngineProfile, scratch_dir: PathBuf) -> Self {
        Self { engine, profile, scratch_dir }
    }

    pub fn engine_path(&self) -> &Path {
        &self.engine
    }

    /// 展开参数模板
    fn args_for(&self, target: &Path) -> Vec<String> {
        let target = target.to_string_lossy();
        self.profile.args.iter().map(|a| a.replace(FILE_PLACEHOLDER, &target)).collect()
    }

    /// 写入临时文件；返回的 TempPath 已关闭句柄，drop 时删除
    fn write_scratch(&self, bytes: &[u8]) -> std::io::Result<TempPath> {
        let mut file = Builder::new().prefix(SCRATCH_PREFIX).tempfile_in(&self.scratch_dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    /// 启动引擎并在超时内等待
    fn run_engine(&self, target: &Path) -> Verdict {
        let mut child = match Command::new(&self.engine)
            .args(self.args_for(target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                warn!(engine = ?self.engine, error = %e, "failed to spawn detection engine");
                return Verdict::Indeterminate;
            }
        };

        match child.wait_timeout(self.profile.timeout) {
            Ok(Some(status)) => verdict_for_exit(status.code(), &self.profile),
            Ok(None) => {
                warn!(timeout = ?self.profile.timeout, "detection engine timed out; killing");
                let _ = child.kill();
                let _ = child.wait();
                Verdict::Indeterminate
            }
            Err(e) => {
                warn!(error = %e, "waiting for detection engine failed");
                let _ = child.kill();
                let _ = child.wait();
                Verdict::Indeterminate
            }
        }
    }
}

impl Oracle for EngineOracle {
    fn classify(&mut self, bytes: &[u8]) -> Verdict {
        let started = Instant::now();
        let scratch = match self.write_scratch(bytes) {
            Ok(p) => p,
            Err(e) => {
                warn!(dir = ?self.scratch_dir, error = %e, "failed to write scratch file");
                return Verdict::Indeterminate;
            }
        };

        let verdict = self.run_engine(&scratch);
        debug!(scratch = ?scratch, prefix_len = bytes.len(), ?verdict, elapsed = ?started.elapsed(), "oracle query");

        // 删除失败只记录，不影响已得到的判定
        let shown = scratch.to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(scratch = ?shown, error = %e, "failed to remove scratch file");
        }
        verdict
    }
}

/// 解析临时目录：显式配置 → 系统临时目录 → %SYSTEMDRIVE%\temp（不存在则创建）
pub fn resolve_scratch_dir(configured: Option<&Path>) -> Result<PathBuf, AnalyzeError> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let tmp = std::env::temp_dir();
    if tmp.is_dir() {
        return Ok(tmp);
    }
    let fallback = match std::env::var_os("SYSTEMDRIVE") {
        Some(drive) => PathBuf::from(format!(r"{}\temp", drive.to_string_lossy())),
        None => tmp,
    };
    std::fs::create_dir_all(&fallback)
        .map_err(|source| AnalyzeError::ScratchDir { path: fallback.clone(), source })?;
    Ok(fallback)
}
