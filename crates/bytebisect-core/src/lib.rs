//! 恶意字节定位核心库
//!
//! 设计要点：
//! - 外部检测引擎被视为黑盒 oracle：给定字节序列，只回答 Malicious / Clean / Indeterminate。
//! - 在“整文件已被判为恶意”的前提下，对前缀长度做标准二分，定位最小恶意前缀。
//! - 单调性假设在结束时校验；违反时报错而不是给出误导性的偏移。
//! - 所有查询严格串行，外部引擎不支持并发调用。

mod analyze;
mod config;
mod error;
mod locate;
mod options;
mod oracle;
mod report;
mod search;
mod verdict;

pub use analyze::{analyze_bytes, analyze_file, AnalysisReport};
pub use config::load_config;
pub use error::{AnalyzeError, ConfigError, SearchError};
pub use locate::locate_engine;
pub use options::{AnalyzeOptions, EngineProfile, SearchOptions, DEFAULT_WINDOW, FILE_PLACEHOLDER};
pub use oracle::{resolve_scratch_dir, verdict_for_exit, EngineOracle, Oracle};
pub use report::{display_window, render_hex_dump, report_json, to_hex, BYTES_PER_ROW};
pub use search::bisect;
pub use verdict::{LocalizedRegion, Probe, SearchOutcome, Verdict};
