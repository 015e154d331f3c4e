//! Calendar-day parsing for rate lookups.

use chrono::NaiveDate;

use crate::error::DomainError;

/// Date format used on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` calendar day.
///
/// The shape is checked first (four digits, dash, two digits, dash, two
/// digits), then the date must be a real calendar day: `2024-02-29` is
/// accepted, `2023-02-29`, `2024-13-01` and `2024-01-32` are not.
pub fn parse_rate_day(input: &str) -> Result<NaiveDate, DomainError> {
    let day = input.trim();
    if day.is_empty() {
        return Err(DomainError::MissingField("date"));
    }

    let bytes = day.as_bytes();
    let shaped = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
    if !shaped {
        return Err(DomainError::InvalidDate(input.to_string()));
    }

    NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_valid_day() {
        let date = parse_rate_day("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(matches!(
            parse_rate_day("2024-13-01"),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_day_of_month() {
        assert!(matches!(
            parse_rate_day("2024-01-32"),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_leap_day_valid_only_in_leap_year() {
        assert!(parse_rate_day("2024-02-29").is_ok());
        assert!(parse_rate_day("2023-02-29").is_err());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(parse_rate_day("24-1-5").is_err());
        assert!(parse_rate_day("2024/01/15").is_err());
        assert!(parse_rate_day("2024-01-15T00:00").is_err());
        assert!(parse_rate_day("yesterday").is_err());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            parse_rate_day(""),
            Err(DomainError::MissingField("date"))
        ));
        assert!(matches!(
            parse_rate_day("   "),
            Err(DomainError::MissingField("date"))
        ));
    }
}
