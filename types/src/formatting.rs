//! Centralized number formatting utilities.
//!
//! All numeric display formatting for CLI summaries goes through this module
//! so conversion and analysis output stay consistent.

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Format a byte count with a binary-unit suffix.
///
/// - Values >= 1 GiB are formatted as `X.XX GB`
/// - Values >= 1 MiB are formatted as `X.XX MB`
/// - Values >= 1 KiB are formatted as `X.XX KB`
/// - Smaller values are formatted as plain bytes
///
/// # Examples
/// ```
/// use skirmish_types::formatting::format_bytes;
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1_536), "1.50 KB");
/// assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
/// assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a number with thousands separators.
///
/// # Examples
/// ```
/// use skirmish_types::formatting::format_thousands;
/// assert_eq!(format_thousands(0), "0");
/// assert_eq!(format_thousands(1_500), "1,500");
/// assert_eq!(format_thousands(1_500_000), "1,500,000");
/// ```
pub fn format_thousands(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3 + 1);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    if n < 0 {
        result.insert(0, '-');
    }
    result
}

/// Format a ratio in `[0, 1]` as a whole-number percentage.
///
/// # Examples
/// ```
/// use skirmish_types::formatting::format_ratio_pct;
/// assert_eq!(format_ratio_pct(0.734), "73%");
/// assert_eq!(format_ratio_pct(0.0), "0%");
/// ```
pub fn format_ratio_pct(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

/// Format an elapsed wall-clock time.
///
/// Sub-minute durations show seconds with one decimal, longer ones switch to
/// `M:SS`.
///
/// # Examples
/// ```
/// use skirmish_types::formatting::format_elapsed;
/// assert_eq!(format_elapsed(4.26), "4.3s");
/// assert_eq!(format_elapsed(125.7), "2:06");
/// ```
pub fn format_elapsed(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }
    let total = secs.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Truncate or pad a name to a fixed display width.
///
/// Names longer than `width` are cut and end in `…` so table columns stay
/// aligned.
pub fn fit_width(name: &str, width: usize) -> String {
    let len = name.chars().count();
    if len <= width {
        return format!("{:<width$}", name, width = width);
    }
    let mut out: String = name.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
