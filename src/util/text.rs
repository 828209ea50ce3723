use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: char = '…';

/// Truncate to at most `max_width` terminal columns, ending with an ellipsis
/// when anything was cut. Borrowed when the string already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut out = String::with_capacity(s.len().min(max_width * 4));
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Remove control characters (including ANSI escape introducers) from text
/// that came off the network before it reaches the terminal.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
            .filter(|c| !c.is_control())
            .collect(),
    )
}

/// Short count for scores and comment totals: 999, 1.2k, 15k, 3.4m.
pub fn compact_count(n: i64) -> String {
    let abs = n.unsigned_abs();
    let sign = if n < 0 { "-" } else { "" };
    match abs {
        0..=999 => format!("{sign}{abs}"),
        1_000..=9_999 => format!("{sign}{:.1}k", abs as f64 / 1_000.0),
        10_000..=999_999 => format!("{sign}{}k", abs / 1_000),
        _ => format!("{sign}{:.1}m", abs as f64 / 1_000_000.0),
    }
}

/// Normalize user input into a subreddit or user name: trims, drops a
/// leading "r/" or "u/" prefix and removes spaces.
pub fn normalize_name(input: &str) -> String {
    let trimmed = input.trim().trim_start_matches('/');
    let bare = ["r/", "u/", "user/"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    bare.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits_borrows() {
        assert!(matches!(truncate_to_width("short", 10), Cow::Borrowed("short")));
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("hello", 0), "");
        assert_eq!(truncate_to_width("hello", 1), "…");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // each CJK char is two columns
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert!(display_width(&truncate_to_width("日本語テキスト", 5)) <= 5);
    }

    #[test]
    fn test_strip_control_chars() {
        assert!(matches!(strip_control_chars("plain"), Cow::Borrowed(_)));
        assert_eq!(strip_control_chars("a\x1b[31mb\nc"), "a[31mb c");
    }

    #[test]
    fn test_compact_count() {
        assert_eq!(compact_count(0), "0");
        assert_eq!(compact_count(999), "999");
        assert_eq!(compact_count(1_234), "1.2k");
        assert_eq!(compact_count(15_600), "15k");
        assert_eq!(compact_count(3_400_000), "3.4m");
        assert_eq!(compact_count(-42), "-42");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  /r/Ask Science "), "AskScience");
        assert_eq!(normalize_name("u/spez"), "spez");
        assert_eq!(normalize_name("rust"), "rust");
    }
}
