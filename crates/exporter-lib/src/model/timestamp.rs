//! Engine timestamp conversion
//!
//! The engine reports times as `YYYY-MM-DDTHH:MM:SS.fffffffffZ` in UTC, with
//! up to nanosecond precision, and uses the zero time for "never".

use crate::error::{ExporterError, Result};
use chrono::NaiveDateTime;

/// The engine's zero time, meaning the event has not happened
pub const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Date, time and at most six fractional digits
const MAX_PREFIX_LEN: usize = 26;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert an engine timestamp to whole Unix seconds, never below zero
pub fn parse_timestamp(value: &str) -> Result<i64> {
    if value == ZERO_TIMESTAMP {
        return Ok(0);
    }

    let body = value
        .strip_suffix('Z')
        .ok_or_else(|| ExporterError::parse(format!("timestamp {value:?} has no UTC marker")))?;
    let prefix = body.get(..MAX_PREFIX_LEN).unwrap_or(body);

    let parsed = NaiveDateTime::parse_from_str(prefix, FORMAT)
        .map_err(|e| ExporterError::parse(format!("invalid timestamp {value:?}: {e}")))?;

    Ok(parsed.and_utc().timestamp().max(0))
}
