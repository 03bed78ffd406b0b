//! Field-level parsers for tabular input.
//!
//! The only place raw strings become typed values. All functions return
//! a plain reason string; callers attach source/row/column context.

use chrono::{NaiveDate, NaiveTime};

use crate::models::Weekday;

/// Splits a `;`-separated multi-valued field into trimmed tokens.
/// Empty input yields an empty list.
pub fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a date, accepting ISO `YYYY-MM-DD` and `DD-MM-YYYY`.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d-%m-%Y"))
        .map_err(|_| format!("'{value}' is not a date (expected YYYY-MM-DD)"))
}

/// Parses a 24-hour `HH:MM` time.
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| format!("'{value}' is not a time (expected HH:MM)"))
}

/// Parses a weekday: 1-7 (Monday = 1) or the tokens `ma di wo do vr za zo`.
pub fn parse_weekday(value: &str) -> Result<Weekday, String> {
    let key = value.trim().to_lowercase();
    let weekday = match key.as_str() {
        "ma" => 1,
        "di" => 2,
        "wo" => 3,
        "do" => 4,
        "vr" => 5,
        "za" => 6,
        "zo" => 7,
        _ => key
            .parse::<u8>()
            .ok()
            .filter(|v| (1..=7).contains(v))
            .ok_or_else(|| format!("'{value}' is not a weekday (1-7 or ma..zo)"))?,
    };
    Ok(weekday)
}

/// Parses a non-negative integer.
pub fn parse_u32(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{value}' is not a non-negative integer"))
}

/// Parses a (possibly negative) integer.
pub fn parse_i64(value: &str) -> Result<i64, String> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{value}' is not an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("a; b ;;c"), vec!["a", "b", "c"]);
        assert!(split_tokens("").is_empty());
        assert!(split_tokens(" ; ").is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(parse_date("2025-06-02").unwrap(), expected);
        assert_eq!(parse_date("02-06-2025").unwrap(), expected);
        assert!(parse_date("June 2nd").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn test_parse_time_strict() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time("9:75").is_err());
        assert!(parse_time("morning").is_err());
    }

    #[test]
    fn test_parse_weekday_tokens_and_numbers() {
        assert_eq!(parse_weekday("ma").unwrap(), 1);
        assert_eq!(parse_weekday("ZO").unwrap(), 7);
        assert_eq!(parse_weekday("4").unwrap(), 4);
        assert!(parse_weekday("0").is_err());
        assert!(parse_weekday("8").is_err());
        assert!(parse_weekday("monday").is_err());
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_u32("5").unwrap(), 5);
        assert!(parse_u32("-1").is_err());
        assert_eq!(parse_i64("-3").unwrap(), -3);
        assert!(parse_i64("3.5").is_err());
    }
}
