//! Timestamp parsing and date-key utilities.
//!
//! Source extracts mix `YYYY-MM-DD HH:MM:SS`, ISO-8601 (`T` separator with an
//! optional fractional part) and bare dates. All of them are normalized to naive
//! UTC timestamps.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::Error;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses a source timestamp.
///
/// A bare `YYYY-MM-DD` date resolves to midnight. A trailing `Z` is accepted for
/// ISO-8601 input.
///
/// # Returns
/// - `Ok(NaiveDateTime)` - Parsed timestamp
/// - `Err(Error::ParseError)` - The value matches none of the accepted formats
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, Error> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::ParseError(format!("Unrecognized timestamp {value:?}")))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::ParseError(format!("Invalid date {value:?}: {e}")))
}

/// Encodes a calendar date as its `yyyymmdd` integer key.
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

/// Serde helper for required timestamp fields.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Serde helper for nullable timestamp fields; empty cells are `None`.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
