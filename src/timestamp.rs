//! Parsing of `created_at` strings as they come out of the project store.
//!
//! Accepted shapes:
//! - RFC 3339 with `Z` or an explicit offset, any fractional precision
//!   (`2024-05-01T12:00:00Z`, `2024-05-01T12:00:00.123456+00:00`)
//! - offset-less date-time, read as UTC (`2024-05-01T12:00:00`, `2024-05-01 12:00:00.5`)
//! - bare date, read as UTC midnight (`2024-05-01`)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::TrendingError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a creation timestamp into a UTC instant.
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, TrendingError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(TrendingError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339_with_zulu_and_offset() {
        let a = parse_created_at("2024-05-01T12:00:00Z").unwrap();
        let b = parse_created_at("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn postgres_style_microseconds() {
        let t = parse_created_at("2024-05-01T12:00:00.123456+00:00").unwrap();
        assert_eq!(t.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn naive_and_date_only_are_utc() {
        let naive = parse_created_at("2024-05-01T12:00:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        let spaced = parse_created_at("2024-05-01 12:00:00.5").unwrap();
        assert_eq!(spaced.timestamp_subsec_millis(), 500);

        let day = parse_created_at("2024-05-01").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        for bad in ["", "yesterday", "2024-13-01", "2024-02-30T00:00:00Z"] {
            let err = parse_created_at(bad).unwrap_err();
            assert!(matches!(err, TrendingError::InvalidTimestamp(_)), "{bad}");
        }
    }
}
