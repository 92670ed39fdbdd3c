use anyhow::{Context, Result};
use bytebisect_core::{analyze_file, load_config, render_hex_dump, report_json, AnalysisReport, AnalyzeOptions};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "bytebisect", version, about = "定位触发杀软检出的最小字节范围")]
struct Cli {
    /// 待分析文件（须已被检测引擎判为恶意）
    file: PathBuf,

    /// 配置文件（TOML）；缺省使用内置的 Windows Defender 描述
    #[arg(long)]
    config: Option<PathBuf>,

    /// 检测引擎可执行文件路径（覆盖目录搜索）
    #[arg(long)]
    engine: Option<PathBuf>,

    /// 单次扫描超时（秒）
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// 同一前缀 Indeterminate 后的重试次数
    #[arg(long)]
    retries: Option<usize>,

    /// 展示窗口大小（字节）
    #[arg(long)]
    window: Option<usize>,

    /// 临时文件目录
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let opts = build_options(&cli)?;
    let report = analyze_file(&cli.file, &opts).with_context(|| format!("analyze {}", cli.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &report_json(&report)).context("write json report")?;
        writeln!(out)?;
    } else {
        print_report(&mut out, &report)?;
    }
    out.flush()?;

    info!(threshold = report.region.threshold, queries = report.outcome.queries, "analysis finished");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写 stderr，stdout 只留给报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 配置文件打底，命令行参数覆盖
fn build_options(cli: &Cli) -> Result<AnalyzeOptions> {
    let mut opts = match &cli.config {
        Some(path) => load_config(path).context("load config")?,
        None => AnalyzeOptions::default(),
    };
    if let Some(engine) = &cli.engine { opts.engine.path = Some(engine.clone()); }
    if let Some(secs) = cli.timeout_secs { opts.engine.timeout = Duration::from_secs(secs); }
    if let Some(n) = cli.retries { opts.search.max_retries = n; }
    if cli.window.is_some() { opts.window = cli.window; }
    if cli.scratch_dir.is_some() { opts.scratch_dir = cli.scratch_dir.clone(); }
    Ok(opts)
}

fn print_report(out: &mut dyn Write, report: &AnalysisReport) -> Result<()> {
    let region = &report.region;
    writeln!(out, "offset END of offending bytes is: {:#x} ({} oracle queries)", region.threshold, report.outcome.queries)?;
    writeln!(out, "--------------OFFENDING BYTES START------------")?;
    write!(out, "{}", render_hex_dump(&region.window, region.window_start))?;
    writeln!(out, "--------------OFFENDING BYTES END--------------")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "bytebisect", "sample.exe", "--engine", "/opt/av/scan", "--timeout-secs", "3", "--retries", "0", "--window", "64",
        ]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.engine.path, Some(PathBuf::from("/opt/av/scan")));
        assert_eq!(opts.engine.timeout, Duration::from_secs(3));
        assert_eq!(opts.search.max_retries, 0);
        assert_eq!(opts.window_len(), 64);
        assert!(!cli.json);
    }

    #[test]
    fn no_flags_keep_builtin_profile() {
        let cli = Cli::parse_from(["bytebisect", "sample.exe"]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.engine.executable, "MpCmdRun.exe");
        assert_eq!(opts.engine.timeout, Duration::from_secs(10));
        assert!(opts.scratch_dir.is_none());
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Cli::try_parse_from(["bytebisect"]).is_err());
    }
}
