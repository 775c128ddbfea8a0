//! Monetary amount extraction from free-form chat text.
//!
//! The tolerant pattern accepts the currency marker immediately before or after
//! a decimal numeral, case-insensitively, with optional whitespace in between:
//! `"GHS 45.50"`, `"45.50ghs"`, `"Ghs 10"`. Only the first match in the text is
//! used. Most chat traffic carries no amount at all - a miss is the expected
//! case and the callers ignore it silently.

use regex::Regex;

/// Returns the first amount tagged with `marker` in `text`, or `None`.
#[must_use]
pub fn extract_amount(text: &str, marker: &str) -> Option<f64> {
    let escaped = regex::escape(marker);
    let pattern = format!(r"(?i)(?:{escaped}\s*([0-9]+\.?[0-9]*)|([0-9]+\.?[0-9]*)\s*{escaped})");
    // The marker is escaped, so the pattern is always valid.
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_before_amount() {
        assert_eq!(extract_amount("GHS 45.50 received", "GHS"), Some(45.50));
    }

    #[test]
    fn test_marker_after_amount() {
        assert_eq!(extract_amount("sent 45.50 GHS just now", "GHS"), Some(45.50));
    }

    #[test]
    fn test_both_positions_yield_same_value() {
        assert_eq!(extract_amount("GHS 10", "GHS"), Some(10.0));
        assert_eq!(extract_amount("10 GHS", "GHS"), Some(10.0));
    }

    #[test]
    fn test_case_insensitive_marker() {
        assert_eq!(extract_amount("ghs 12.25", "GHS"), Some(12.25));
        assert_eq!(extract_amount("12.25 Ghs", "GHS"), Some(12.25));
    }

    #[test]
    fn test_no_whitespace_between_marker_and_amount() {
        assert_eq!(extract_amount("GHS120", "GHS"), Some(120.0));
        assert_eq!(extract_amount("120GHS", "GHS"), Some(120.0));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract_amount("GHS 5 then later GHS 99", "GHS"),
            Some(5.0)
        );
    }

    #[test]
    fn test_integer_amount() {
        assert_eq!(extract_amount("120 GHS mobile money", "GHS"), Some(120.0));
    }

    #[test]
    fn test_no_marker_is_a_miss() {
        assert_eq!(extract_amount("thanks, received 45.50", "GHS"), None);
        assert_eq!(extract_amount("hello there", "GHS"), None);
    }

    #[test]
    fn test_marker_without_number_is_a_miss() {
        assert_eq!(extract_amount("GHS rates are up today", "GHS"), None);
    }

    #[test]
    fn test_trailing_decimal_point_parses() {
        assert_eq!(extract_amount("GHS 45.", "GHS"), Some(45.0));
    }

    #[test]
    fn test_different_marker() {
        assert_eq!(extract_amount("NGN 300.75 paid", "NGN"), Some(300.75));
        assert_eq!(extract_amount("GHS 300.75 paid", "NGN"), None);
    }
}
