//! Timestamp and calendar date utilities

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

/// Calendar date format used by record dates and export file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// ISO-8601 timestamp with millisecond precision and `Z` suffix
pub fn to_iso8601(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a `YYYY-MM-DD` calendar date, ignoring surrounding whitespace
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_to_iso8601_uses_millis_and_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(to_iso8601(ts), "2024-03-09T07:05:01.000Z");
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            parse_calendar_date(" 2024-01-05 "),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn test_parse_calendar_date_rejects_garbage() {
        assert!(parse_calendar_date("2023-02-29").is_none());
        assert!(parse_calendar_date("03/04/2024").is_none());
        assert!(parse_calendar_date("").is_none());
    }
}
