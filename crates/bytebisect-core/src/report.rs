//! 结果展示：窗口截断、十六进制转储、JSON 输出项
use std::fmt::Write as _;
use std::ops::Range;

use crate::analyze::AnalysisReport;

/// 每行字节数
pub const BYTES_PER_ROW: usize = 16;

/// 以 `threshold` 结尾、长度至多 `window` 的展示范围（向文件头截断，不越过文件尾）
pub fn display_window(len: usize, threshold: usize, window: usize) -> Range<usize> {
    let end = threshold.min(len);
    end.saturating_sub(window)..end
}

/// 渲染十六进制转储：`OFFSET  hh hh .. hh  - ASCII`
/// - 每行 16 字节，偏移为 8 位十六进制
/// - 最后一行补齐空格，保证 ASCII 列对齐
/// - 仅 0x20..=0x7E 视为可打印，其余显示为 `.`
pub fn render_hex_dump(bytes: &[u8], base_offset: usize) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(BYTES_PER_ROW).enumerate() {
        let _ = write!(out, "{:08x}  ", base_offset + row * BYTES_PER_ROW);
        for b in chunk {
            let _ = write!(out, "{b:02x} ");
        }
        for _ in chunk.len()..BYTES_PER_ROW {
            out.push_str("   ");
        }
        out.push_str("- ");
        out.extend(chunk.iter().map(|&b| if (0x20..=0x7E).contains(&b) { b as char } else { '.' }));
        out.push('\n');
    }
    out
}

/// 小写十六进制串
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// `--json` 模式下的单个输出对象
pub fn report_json(report: &AnalysisReport) -> serde_json::Value {
    serde_json::json!({
        "file": report.file.display().to_string(),
        "file_size": report.file_size,
        "engine": report.engine.display().to_string(),
        "threshold": report.region.threshold,
        "window_start": report.region.window_start,
        "window_hex": to_hex(&report.region.window),
        "queries": report.outcome.queries,
        "probes": report.outcome.probes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped_at_file_start() {
        assert_eq!(display_window(1000, 100, 256), 0..100);
        assert_eq!(display_window(1000, 0, 256), 0..0);
        assert_eq!(display_window(1000, 600, 256), 344..600);
        assert_eq!(display_window(1000, 256, 256), 0..256);
    }

    #[test]
    fn window_never_passes_file_end() {
        assert_eq!(display_window(10, 50, 4), 6..10);
    }

    #[test]
    fn full_row_layout() {
        let bytes: Vec<u8> = (0x41..0x51).collect();
        let dump = render_hex_dump(&bytes, 0x20);
        assert_eq!(
            dump,
            "00000020  41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50 - ABCDEFGHIJKLMNOP\n"
        );
    }

    #[test]
    fn partial_row_is_padded_and_non_printables_dotted() {
        let dump = render_hex_dump(&[0x00, b'M', b'Z', 0x7f, 0xff, b' '], 0);
        let expected = format!("00000000  00 4d 5a 7f ff 20 {}- .MZ.. \n", "   ".repeat(10));
        assert_eq!(dump, expected);
    }

    #[test]
    fn rows_advance_offset() {
        let dump = render_hex_dump(&[b'a'; 40], 0x1f0);
        let offsets: Vec<&str> = dump.lines().map(|l| &l[..8]).collect();
        assert_eq!(offsets, vec!["000001f0", "00000200", "00000210"]);
        let ascii_col = dump.lines().map(|l| l.find("- ").unwrap()).collect::<Vec<_>>();
        assert!(ascii_col.iter().all(|&c| c == ascii_col[0]));
    }

    #[test]
    fn empty_window_renders_nothing() {
        assert_eq!(render_hex_dump(&[], 0), "");
    }

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(to_hex(&[0xde, 0xAD, 0x01]), "dead01");
    }
}
