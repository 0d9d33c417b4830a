//! Parsing of human-readable size text from catalog listings.

use std::sync::OnceLock;

use regex::Regex;

/// Matches a decimal number followed by a unit token, e.g. "24.9 MB".
/// Units are case-sensitive, exactly as the listing site emits them.
fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([\d.]+)\s*([KMG]B)").expect("static size pattern"))
}

/// Parses size text like "24.9 MB" into megabytes.
///
/// KB divides by 1024, GB multiplies by 1024, MB passes through. Returns
/// `0.0` with a warning when no size can be recognized: unparseable sizes
/// are deliberately treated as zero rather than rejected, so a zero-size
/// item passes any minimum-size filter of zero. Callers that want stricter
/// behavior must filter on the returned value.
pub fn parse_size_mb(text: &str) -> f64 {
    let Some(captures) = size_pattern().captures(text) else {
        tracing::warn!("Unparseable size text: {text:?}");
        return 0.0;
    };

    let number = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok());
    let Some(number) = number else {
        tracing::warn!("Unparseable size number in: {text:?}");
        return 0.0;
    };

    match captures.get(2).map(|m| m.as_str()) {
        Some("KB") => number / 1024.0,
        Some("GB") => number * 1024.0,
        _ => number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megabytes_pass_through() {
        assert_eq!(parse_size_mb("24.9 MB"), 24.9);
        assert_eq!(parse_size_mb("500MB"), 500.0);
    }

    #[test]
    fn test_units_are_consistent() {
        let tolerance = 1e-9;
        assert!((parse_size_mb("1024KB") - parse_size_mb("1MB")).abs() < tolerance);
        assert!((parse_size_mb("1GB") - parse_size_mb("1024MB")).abs() < tolerance);
    }

    #[test]
    fn test_kilobytes_scale_down() {
        assert_eq!(parse_size_mb("512 KB"), 0.5);
    }

    #[test]
    fn test_gigabytes_scale_up() {
        assert_eq!(parse_size_mb("2.5 GB"), 2560.0);
    }

    #[test]
    fn test_unparseable_defaults_to_zero() {
        assert_eq!(parse_size_mb(""), 0.0);
        assert_eq!(parse_size_mb("huge"), 0.0);
        // Lowercase units are not emitted by the site and do not match
        assert_eq!(parse_size_mb("10 mb"), 0.0);
    }

    #[test]
    fn test_size_embedded_in_text() {
        assert_eq!(parse_size_mb("size: 42 MB (approx)"), 42.0);
    }

    #[test]
    fn test_malformed_number_defaults_to_zero() {
        // Many dots survive the character class but not the float parse
        assert_eq!(parse_size_mb("1.2.3.4 MB"), 0.0);
    }
}
