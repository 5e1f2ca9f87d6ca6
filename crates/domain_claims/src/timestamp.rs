//! Claim timestamps
//!
//! Every timestamp is held at microsecond precision, the resolution of
//! Postgres `TIMESTAMPTZ`, so a value read back equals the value written.
//!
//! Seed exports carry either naive `YYYY-MM-DDTHH:MM:SS` stamps (taken as UTC)
//! or full RFC 3339 stamps with an offset.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const STORED_SUBSEC_DIGITS: u16 = 6;

/// Current time at stored precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Parses a seed-file timestamp, truncated to stored precision
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(value, NAIVE_FORMAT).ok()?.and_utc(),
    };
    Some(parsed.trunc_subsecs(STORED_SUBSEC_DIGITS))
}

/// Serde adapter for `#[serde(deserialize_with = "timestamp::deserialize")]`
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_naive_timestamp_is_utc() {
        let parsed = parse("2024-03-01T10:15:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap());
    }

    #[test]
    fn test_fractional_seconds_are_accepted() {
        let parsed = parse("2024-03-01T10:15:30.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_offset_is_normalised() {
        let parsed = parse("2024-03-01T10:15:30+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 30).unwrap());
    }

    #[test]
    fn test_nanoseconds_are_truncated_to_micros() {
        let parsed = parse("2024-03-01T10:15:30.583012556Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_nanos(), 583_012_000);
    }

    #[test]
    fn test_now_has_no_sub_microsecond_part() {
        for _ in 0..100 {
            assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse("yesterday").is_none());
        assert!(parse("2024-03-01").is_none());
    }
}
