//! 配置文件加载（TOML）
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::options::AnalyzeOptions;

/// `[engine]` 表，所有字段可选，缺省沿用默认引擎描述
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineEntry {
    #[serde(default)]
    executable: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    search_dirs: Option<Vec<PathBuf>>,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    clean_exit_codes: Option<Vec<i32>>,
    #[serde(default)]
    malicious_exit_codes: Option<Vec<i32>>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// `[search]` 表
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchEntry {
    #[serde(default)]
    max_retries: Option<usize>,
    #[serde(default)]
    window: Option<usize>,
    #[serde(default)]
    scratch_dir: Option<PathBuf>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineEntry,
    #[serde(default)]
    search: SearchEntry,
}

/// 从 TOML 文件加载并叠加到默认选项之上
pub fn load_config(path: &Path) -> Result<AnalyzeOptions, ConfigError> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_config(&txt).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// 解析配置文本（与文件来源无关，便于测试）
pub(crate) fn parse_config(txt: &str) -> Result<AnalyzeOptions, toml::de::Error> {
    let parsed: ConfigFile = toml::from_str(txt)?;
    let mut opts = AnalyzeOptions::default();

    let e = parsed.engine;
    if let Some(v) = e.executable { opts.engine.executable = v; }
    if e.path.is_some() { opts.engine.path = e.path; }
    if let Some(v) = e.search_dirs { opts.engine.search_dirs = v; }
    if let Some(v) = e.args { opts.engine.args = v; }
    if let Some(v) = e.clean_exit_codes { opts.engine.clean_exit_codes = v; }
    if let Some(v) = e.malicious_exit_codes { opts.engine.malicious_exit_codes = v; }
    if let Some(secs) = e.timeout_secs { opts.engine.timeout = Duration::from_secs(secs); }

    let s = parsed.search;
    if let Some(v) = s.max_retries { opts.search.max_retries = v; }
    opts.window = s.window;
    opts.scratch_dir = s.scratch_dir;

    Ok(opts)
}
