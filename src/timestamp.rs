//! Poll timestamps.
//!
//! Expirations travel over the wire as fixed-width `YYYY/MM/DD HH:mm` strings
//! (UTC). Inside the service they are [`DateTime<Utc>`] and compared as real
//! instants.
use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};

/// Zero-padded, minute-granular wire format.
pub const WIRE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Lifetime of a poll created without an explicit expiration.
pub const DEFAULT_POLL_DAYS: i64 = 30;

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(WIRE_FORMAT).to_string()
}

/// Accepts the wire format or RFC 3339.
pub fn parse(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, WIRE_FORMAT) {
        return Some(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::minutes(1)).unwrap_or(ts)
}

/// Expiration given to a poll created at `now` without one.
pub fn default_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_minute(now + TimeDelta::days(DEFAULT_POLL_DAYS))
}

/// Serde adapter for `#[serde(with = "crate::timestamp::wire")]`.
pub mod wire {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
