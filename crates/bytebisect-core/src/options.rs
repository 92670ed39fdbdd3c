//! 引擎描述、搜索与分析选项（模块）
use std::path::PathBuf;
use std::time::Duration;

/// 参数模板中代表扫描目标路径的占位符
pub const FILE_PLACEHOLDER: &str = "{file}";

/// 默认展示窗口大小（字节）
pub const DEFAULT_WINDOW: usize = 256;

/// 外部检测引擎描述
/// - 默认值对应 Windows Defender 的 MpCmdRun.exe（自定义扫描、禁用修复）
/// - 只解释退出码，不解析 stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    /// 可执行文件名（在搜索目录与 PATH 中查找）
    pub executable: String,
    /// 显式路径；存在时优先于目录搜索
    pub path: Option<PathBuf>,
    /// 已知安装目录
    pub search_dirs: Vec<PathBuf>,
    /// 参数模板，`{file}` 会被替换为临时文件路径
    pub args: Vec<String>,
    /// 表示“未检出”的退出码
    pub clean_exit_codes: Vec<i32>,
    /// 表示“检出恶意内容”的退出码
    pub malicious_exit_codes: Vec<i32>,
    /// 单次扫描的墙钟超时
    pub timeout: Duration,
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self {
            executable: "MpCmdRun.exe".to_string(),
            path: None,
            search_dirs: vec![PathBuf::from(r"C:\Program Files\Windows Defender\")],
            args: ["-Scan", "-ScanType", "3", "-File", FILE_PLACEHOLDER, "-DisableRemediation"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            clean_exit_codes: vec![0],
            malicious_exit_codes: vec![2],
            timeout: Duration::from_secs(10),
        }
    }
}

/// 二分搜索选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// 同一前缀长度首次 Indeterminate 之后的重试次数
    pub max_retries: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

/// 端到端分析选项（CLI 组装后传入）
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub engine: EngineProfile,
    pub search: SearchOptions,
    /// 展示窗口大小；None 表示使用 DEFAULT_WINDOW
    pub window: Option<usize>,
    /// 临时文件目录；None 表示系统临时目录
    pub scratch_dir: Option<PathBuf>,
}

impl AnalyzeOptions {
    pub fn window_len(&self) -> usize {
        self.window.unwrap_or(DEFAULT_WINDOW)
    }
}
