//! Parsers for human-readable configuration values.
//!
//! All parsers are total: unparseable input yields `None` and the caller
//! treats it as "not configured". A malformed size string must never prevent
//! the logger from being built.

/// Parse a human-readable size string into a byte count.
///
/// Grammar: a decimal number followed by an optional unit letter
/// (`K`, `M`, `G`, `T`, case-insensitive, powers of 1024) and an optional
/// trailing `B`. `"10M"` is 10,485,760; `"100"` is 100 bytes.
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if digits_end == 0 {
        return None;
    }

    let number: u64 = s[..digits_end].parse().ok()?;

    let mut unit = s[digits_end..].trim().to_ascii_uppercase();
    if unit.ends_with('B') {
        unit.pop();
    }

    let multiplier: u64 = match unit.as_str() {
        "" => 1,
        "K" => 1024,
        "M" => 1024 * 1024,
        "G" => 1024 * 1024 * 1024,
        "T" => 1024 * 1024 * 1024 * 1024,
        _ => return None,
    };

    number.checked_mul(multiplier)
}

/// Parse a non-negative integer count (e.g. retained rotated files).
pub fn parse_count(input: &str) -> Option<u32> {
    input.trim().parse().ok()
}

/// Parse a boolean-like configuration value.
///
/// Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`,
/// case-insensitive. Anything else is `None`.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("10M"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("1G"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_size("500K"), Some(512_000));
        assert_eq!(parse_size("2T"), Some(2 * 1024u64.pow(4)));
    }

    #[test]
    fn test_parse_size_plain_number() {
        assert_eq!(parse_size("100"), Some(100));
        assert_eq!(parse_size("0"), Some(0));
    }

    #[test]
    fn test_parse_size_case_insensitive() {
        assert_eq!(parse_size("10m"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("1g"), Some(1024 * 1024 * 1024));
    }

    #[test]
    fn test_parse_size_trailing_b() {
        assert_eq!(parse_size("10MB"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("10mb"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("100B"), Some(100));
    }

    #[test]
    fn test_parse_size_whitespace() {
        assert_eq!(parse_size(" 10M "), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("10 M"), Some(10 * 1024 * 1024));
    }

    #[test]
    fn test_parse_size_invalid() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("M"), None);
        assert_eq!(parse_size("ten"), None);
        assert_eq!(parse_size("10X"), None);
        assert_eq!(parse_size("10MBB"), None);
        assert_eq!(parse_size("-5M"), None);
    }

    #[test]
    fn test_parse_size_overflow() {
        assert_eq!(parse_size("99999999999999999999"), None);
        assert_eq!(parse_size("18446744073709551615T"), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5"), Some(5));
        assert_eq!(parse_count(" 10 "), Some(10));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("five"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
