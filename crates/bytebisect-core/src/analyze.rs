//! 分析主流程：输入校验 → 引擎定位 → 整文件初扫 → 二分定位 → 截取展示窗口
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use tracing::info;

use crate::error::AnalyzeError;
use crate::locate::locate_engine;
use crate::oracle::{resolve_scratch_dir, EngineOracle, Oracle};
use crate::options::AnalyzeOptions;
use crate::search::bisect;
use crate::verdict::{LocalizedRegion, SearchOutcome, Verdict};

/// 一次完整分析的结果（便于 CLI 打印）
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub file: PathBuf,
    pub file_size: usize,
    pub engine: PathBuf,
    pub outcome: SearchOutcome,
    pub region: LocalizedRegion,
}

/// 使用外部检测引擎分析单个文件
pub fn analyze_file(path: &Path, opts: &AnalyzeOptions) -> Result<AnalysisReport, AnalyzeError> {
    let buf = read_input(path)?;
    info!(file = ?path, size = buf.len(), "file to analyze");

    let engine = locate_engine(&opts.engine)?;
    info!(?engine, "found detection engine");

    let scratch_dir = resolve_scratch_dir(opts.scratch_dir.as_deref())?;
    let mut oracle = EngineOracle::new(engine, opts.engine.clone(), scratch_dir);
    let (outcome, region) = analyze_bytes(&buf, &mut oracle, opts, None)?;

    Ok(AnalysisReport {
        file: path.to_path_buf(),
        file_size: buf.len(),
        engine: oracle.engine_path().to_path_buf(),
        outcome,
        region,
    })
}

/// 对内存中的缓冲区执行初扫与二分（oracle 可替换）
/// - 初扫 Clean → `NotMalicious`；Indeterminate → `UnknownVerdict`
pub fn analyze_bytes<O: Oracle + ?Sized>(
    buf: &[u8],
    oracle: &mut O,
    opts: &AnalyzeOptions,
    cancel: Option<&AtomicBool>,
) -> Result<(SearchOutcome, LocalizedRegion), AnalyzeError> {
    match oracle.classify(buf) {
        Verdict::Malicious => info!("file does contain malware, starting analysis"),
        Verdict::Clean => return Err(AnalyzeError::NotMalicious),
        Verdict::Indeterminate => return Err(AnalyzeError::UnknownVerdict),
    }

    let outcome = bisect(buf, oracle, &opts.search, cancel)?;
    let region = LocalizedRegion::from_buffer(buf, outcome.threshold, opts.window_len());
    info!(threshold = outcome.threshold, end_offset = %format!("{:#x}", outcome.threshold), "found end offset of offending bytes");
    Ok((outcome, region))
}

/// 读取待分析文件，区分不存在 / 目录 / 读取失败
fn read_input(path: &Path) -> Result<Vec<u8>, AnalyzeError> {
    let meta = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(AnalyzeError::InputMissing(path.to_path_buf())),
        Err(source) => return Err(AnalyzeError::InputUnreadable { path: path.to_path_buf(), source }),
    };
    if meta.is_dir() {
        return Err(AnalyzeError::InputIsDirectory(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|source| AnalyzeError::InputUnreadable { path: path.to_path_buf(), source })
}
