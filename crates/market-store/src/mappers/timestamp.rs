//! Timestamp encoding
//!
//! Written as RFC 3339 strings. Read leniently: RFC 3339 strings, epoch
//! milliseconds, and exported timestamp objects (`{_seconds, _nanoseconds}`
//! or `{seconds, nanoseconds}`) are all accepted.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        Value::Object(obj) => {
            let seconds = obj
                .get("_seconds")
                .or_else(|| obj.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = obj
                .get("_nanoseconds")
                .or_else(|| obj.get("nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}
