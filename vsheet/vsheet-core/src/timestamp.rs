//! UTC timestamps rendered as ISO-8601 with a literal `Z` designator,
//! e.g. `2024-01-15T10:30:00.123456Z`.
//!
//! Use as `#[serde(with = "crate::timestamp")]` on `DateTime<Utc>` fields.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub type Timestamp = DateTime<Utc>;

/// Current time, truncated to the microsecond precision timestamps are
/// stored with so that in-memory and reloaded values compare equal.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Values without an offset are read as UTC.
pub fn parse(s: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}
