// Small parsing and formatting helpers shared by the loaders and main.
use num_format::{Locale, ToFormattedString};
use std::num::ParseIntError;

/// Parse an integer CSV field, tolerating surrounding whitespace.
///
/// Unlike a plain `str::parse`, a field like `" 120 "` is accepted. Anything
/// else that is not a base-10 `i64` (empty, decimals, text) is rejected.
pub fn parse_int_field(s: &str) -> Result<i64, ParseIntError> {
    s.trim().parse::<i64>()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `12,480 records`.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_field_accepts_padded_values() {
        assert_eq!(parse_int_field("100"), Ok(100));
        assert_eq!(parse_int_field(" 250 "), Ok(250));
        assert_eq!(parse_int_field("-7"), Ok(-7));
        assert_eq!(parse_int_field("+7"), Ok(7));
    }

    #[test]
    fn test_parse_int_field_rejects_non_integers() {
        assert!(parse_int_field("").is_err());
        assert!(parse_int_field("   ").is_err());
        assert!(parse_int_field("12.5").is_err());
        assert!(parse_int_field("abc").is_err());
        assert!(parse_int_field("1,000").is_err());
    }

    #[test]
    fn test_format_int_groups_thousands() {
        assert_eq!(format_int(0usize), "0");
        assert_eq!(format_int(1234567usize), "1,234,567");
    }
}
