//! Timestamp parsing.
//!
//! Engines emit ISO-8601 timestamps with or without an offset, and `SQLite`'s
//! `datetime('now')` default uses a space separator. Naive values are taken
//! as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::CoreError;

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a timestamp in any of the accepted formats.
///
/// # Errors
///
/// Returns `CoreError::Timestamp` if the string matches no accepted format.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(CoreError::Timestamp {
        value: s.to_string(),
        reason: "expected RFC 3339 or YYYY-MM-DD[T ]HH:MM:SS".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-10-12T12:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn parses_naive_iso_as_utc() {
        let dt = parse_timestamp("2025-10-12T10:30:00.250").unwrap();
        assert_eq!((dt.year(), dt.hour(), dt.minute()), (2025, 10, 30));
    }

    #[test]
    fn parses_sqlite_default_format() {
        let dt = parse_timestamp("2025-10-12 10:30:05").unwrap();
        assert_eq!(dt.second(), 5);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(CoreError::Timestamp { .. })
        ));
    }
}
