//! Watermark conversion and human-readable ages.

use chrono::{TimeZone, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Convert a millisecond Unix epoch watermark into a UTC instant.
///
/// Negative values are rejected; sync clients always send a real past
/// instant (or `0` for a full resync).
pub fn watermark_from_millis(last_updated_ms: i64) -> Result<Timestamp, CoreError> {
    if last_updated_ms < 0 {
        return Err(CoreError::Validation(
            "last_updated_ms must not be negative".to_string(),
        ));
    }
    Utc.timestamp_millis_opt(last_updated_ms)
        .single()
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "last_updated_ms {last_updated_ms} is out of range"
            ))
        })
}

/// Describe how long ago `then` was, relative to `now` ("5 minutes ago").
pub fn humanize_since(then: Timestamp, now: Timestamp) -> String {
    let secs = (now - then).num_seconds();
    if secs < 10 {
        return "just now".to_string();
    }

    let (count, unit) = match secs {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };

    match (count, unit) {
        (1, "hour") => "an hour ago".to_string(),
        (1, unit) => format!("a {unit} ago"),
        (n, unit) => format!("{n} {unit}s ago"),
    }
}
