//! Lenient field decoding for persisted records.
//!
//! Persisted inventory data is frequently malformed (numbers stored as strings,
//! nulls, missing fields). These helpers turn whatever was stored into a usable
//! value: numeric strings are parsed, anything else collapses to a neutral
//! default. Non-finite results never escape.

use core::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Coerce a JSON value into a finite `f64`, falling back to `0.0`.
pub fn coerce_number(value: &JsonValue) -> f64 {
    let parsed = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Coerce a JSON value into a string (numbers are rendered, everything else is empty).
pub fn coerce_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value into a UTC timestamp.
///
/// Accepts RFC 3339 strings and integer epoch milliseconds.
pub fn coerce_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// First non-null value stored under any of `keys`, in order.
///
/// Records written by different clients mix camelCase and snake_case names;
/// when several are present the earliest key wins.
pub fn field<'a>(record: &'a JsonMap<String, JsonValue>, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

pub fn number_field(record: &JsonMap<String, JsonValue>, keys: &[&str]) -> f64 {
    field(record, keys).map(coerce_number).unwrap_or(0.0)
}

pub fn string_field(record: &JsonMap<String, JsonValue>, keys: &[&str]) -> String {
    field(record, keys).map(coerce_string).unwrap_or_default()
}

/// First key holding a parseable timestamp.
pub fn timestamp_field(record: &JsonMap<String, JsonValue>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find_map(coerce_timestamp)
}

/// Parse an optional identifier; unparseable values become `None`.
pub fn parse_field<T: FromStr>(record: &JsonMap<String, JsonValue>, keys: &[&str]) -> Option<T> {
    field(record, keys)
        .map(coerce_string)
        .and_then(|s| s.trim().parse::<T>().ok())
}
