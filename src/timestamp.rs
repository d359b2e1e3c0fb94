use regex::Regex;
use std::sync::OnceLock;

/// Matches `mm:ss` and `hh:mm:ss` with 1-2 digit leading fields, as produced
/// by the transcription backend inside answer text.
const TIMESTAMP_PATTERN: &str = r"\b(\d{1,2}:\d{2}(?::\d{2})?)\b";

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("valid timestamp pattern"))
}

/// Convert `hh:mm:ss` or `mm:ss` text to total seconds. Unrecognized input
/// maps to 0 rather than an error, matching how lenient the chat display is.
pub fn parse_timestamp(ts: &str) -> u64 {
    let parts: Vec<u64> = ts
        .split(':')
        .map(|p| p.parse::<u64>().unwrap_or(0))
        .collect();
    match parts.as_slice() {
        [h, m, s] => h * 3600 + m * 60 + s,
        [m, s] => m * 60 + s,
        _ => 0,
    }
}

/// Normalize a timestamp to `mm:ss`, where minutes absorb any hours
/// component ("01:02:03" becomes "62:03").
pub fn format_timestamp(ts: &str) -> String {
    let total = parse_timestamp(ts);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Byte ranges of every timestamp in `text`, for styled rendering.
pub fn timestamp_ranges(text: &str) -> Vec<std::ops::Range<usize>> {
    timestamp_regex()
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}

/// The first timestamp embedded in `text`, normalized to `mm:ss`.
pub fn first_timestamp(text: &str) -> Option<String> {
    timestamp_regex()
        .find(text)
        .map(|m| format_timestamp(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mm_ss() {
        assert_eq!(parse_timestamp("05:30"), 330);
    }

    #[test]
    fn test_parse_hh_mm_ss() {
        assert_eq!(parse_timestamp("01:02:03"), 3723);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_timestamp("later"), 0);
        assert_eq!(parse_timestamp(""), 0);
    }

    #[test]
    fn test_format_normalizes_hours_into_minutes() {
        assert_eq!(format_timestamp("01:02:03"), "62:03");
        assert_eq!(format_timestamp("05:30"), "05:30");
        assert_eq!(format_timestamp("00:05:30"), "05:30");
    }

    #[test]
    fn test_ranges_find_all_in_order() {
        let text = "Covered at 00:05:30, revisited near 12:45.";
        let found: Vec<&str> = timestamp_ranges(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(found, vec!["00:05:30", "12:45"]);
    }

    #[test]
    fn test_first_timestamp_is_normalized() {
        let answer = "The topic at 00:05:30 is linear algebra.";
        assert_eq!(first_timestamp(answer), Some("05:30".to_string()));
    }

    #[test]
    fn test_first_timestamp_none_without_match() {
        assert_eq!(first_timestamp("No times mentioned here."), None);
    }
}
