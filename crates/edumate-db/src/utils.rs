//! Shared utility functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Timestamps are stored as RFC3339 text; a row that somehow carries an
/// unparseable value falls back to the current time instead of failing the
/// whole query.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Trim a string and drop it entirely if nothing is left
pub fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a calendar date given either as `YYYY-MM-DD` or as a full timestamp
///
/// Timestamps with an offset are converted to UTC before the date is taken.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Serde adapter for optional dates accepted in either form of `parse_date_lenient`
pub mod lenient_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_date_lenient(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now("invalid");
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_trimmed_non_empty() {
        assert_eq!(trimmed_non_empty(Some("  Main ".to_string())), Some("Main".to_string()));
        assert_eq!(trimmed_non_empty(Some("   ".to_string())), None);
        assert_eq!(trimmed_non_empty(None), None);
    }

    #[test]
    fn test_parse_date_lenient() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 12);
        assert_eq!(parse_date_lenient("2025-04-12"), expected);
        assert_eq!(parse_date_lenient("2025-04-12T00:00:00.000Z"), expected);
        assert_eq!(parse_date_lenient("2025-04-12T23:30:00-02:00"), NaiveDate::from_ymd_opt(2025, 4, 13));
        assert_eq!(parse_date_lenient("2025-04-12T09:15:00"), expected);
        assert_eq!(parse_date_lenient("12/04/2025"), None);
        assert_eq!(parse_date_lenient("2025-02-30"), None);
    }
}
