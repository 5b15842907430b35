//! Text progress bar

/// Full block character used for each bar segment
pub const BLOCK: char = '\u{2588}';

/// Number of bar segments at 100%
pub const SEGMENTS: usize = 20;

/// Default text printed right after the percentage
pub const DEFAULT_SUFFIX: &str = "%";

/// Number of filled segments for a percentage.
///
/// Ties round to even, so 12.5% (2.5 segments) shows two blocks.
pub fn filled_segments(percentage: f64) -> usize {
    (percentage / 5.0).round_ties_even().clamp(0.0, SEGMENTS as f64) as usize
}

/// Format a percentage without a trailing `.0` for whole numbers
pub fn format_percentage(percentage: f64) -> String {
    if percentage.fract() == 0.0 {
        format!("{}", percentage as i64)
    } else {
        format!("{:.1}", percentage)
    }
}

/// Render the bar line, e.g. `████ 20%`
pub fn make_bar(percentage: f64, suffix: &str) -> String {
    let bar: String = std::iter::repeat(BLOCK)
        .take(filled_segments(percentage))
        .collect();
    format!("{} {}{}", bar, format_percentage(percentage), suffix)
}

/// Render the full message body: optional header, bar line, then every log
/// line in the order it was appended.
pub fn render(percentage: f64, log_lines: &[String], suffix: &str, prefix: Option<&str>) -> String {
    let mut content: Vec<&str> = Vec::with_capacity(log_lines.len() + 2);
    if let Some(prefix) = prefix {
        content.push(prefix);
    }
    let bar = make_bar(percentage, suffix);
    content.push(&bar);
    content.extend(log_lines.iter().map(String::as_str));
    content.join("\n")
}
