//! 错误分类
use std::path::PathBuf;
use thiserror::Error;

/// 二分搜索阶段的失败
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// 同一前缀长度连续返回 Indeterminate，重试预算耗尽
    #[error("oracle unavailable: {attempts} indeterminate verdicts at prefix length {prefix_len}")]
    OracleUnavailable { prefix_len: usize, attempts: usize },

    /// 空前缀被判为恶意，但更长的前缀 `clean_at` 却判为干净
    #[error(
        "non-monotonic oracle: empty prefix reported malicious while prefix length {clean_at} reported clean; located offset cannot be trusted"
    )]
    NonMonotonic { clean_at: usize },

    #[error("search cancelled after {queries} oracle queries")]
    Cancelled { queries: usize },
}

/// 配置文件加载失败
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 端到端分析失败（CLI 据此打印并以非零状态退出）
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("file does not exist: {0:?}")]
    InputMissing(PathBuf),

    #[error("file is a directory: {0:?}")]
    InputIsDirectory(PathBuf),

    #[error("cannot read file {path:?}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find detection engine {executable}; looked in: {}", display_paths(.searched))]
    EngineNotFound { executable: String, searched: Vec<PathBuf> },

    #[error("file was not detected as malware")]
    NotMalicious,

    #[error("unknown result from initial scan (timeout, crash or unexpected exit status)")]
    UnknownVerdict,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("prepare scratch directory {path:?}")]
    ScratchDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<nowhere>".to_string();
    }
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
