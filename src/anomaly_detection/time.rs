//! Hour-of-day extraction from loosely formatted timestamps.
//!
//! Inbound transactions carry timestamps copy-pasted from upstream systems,
//! so parsing has to degrade instead of failing: malformed input falls back
//! to a metadata hint and finally to the current UTC hour.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::Value;
use tracing::debug;

/// Source of the current UTC hour, injected so tests can pin the fallback.
pub trait Clock: Send + Sync {
    /// Current hour of day in UTC, 0-23.
    fn utc_hour(&self) -> u32;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn utc_hour(&self) -> u32 {
        Utc::now().hour()
    }
}

/// Clock pinned to a fixed hour, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn utc_hour(&self) -> u32 {
        self.0
    }
}

/// Extracts an hour of day (0-23) from a transaction timestamp.
///
/// No timezone conversion is performed beyond parsing an offset literal: the
/// returned hour is whatever local hour field the timestamp carries, which is
/// what the unusual-hour rule is calibrated against.
#[derive(Clone)]
pub struct TimestampNormalizer {
    clock: Arc<dyn Clock>,
}

impl TimestampNormalizer {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Extract the hour of day from `timestamp`, falling back to
    /// `meta["hour"]` and then the clock's current UTC hour.
    ///
    /// Accepted inputs, tried in order: RFC 3339 (a trailing `Z` is first
    /// normalized to `+00:00`), a naive `T`- or space-separated datetime, and
    /// a bare date (hour 0). Anything else takes the fallback chain; this
    /// never errors.
    pub fn extract_hour(&self, timestamp: &str, meta: &HashMap<String, Value>) -> u32 {
        if timestamp.is_empty() {
            return self.fallback_hour(meta);
        }

        match Self::parse_hour(timestamp) {
            Some(hour) => hour,
            None => {
                debug!(timestamp, "unparseable timestamp, using fallback hour");
                self.fallback_hour(meta)
            }
        }
    }

    fn parse_hour(timestamp: &str) -> Option<u32> {
        // RFC 3339 parsers reject the bare `Z` suffix form some upstreams emit.
        let normalized = match timestamp.strip_suffix('Z') {
            Some(stripped) => format!("{stripped}+00:00"),
            None => timestamp.to_string(),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Some(dt.hour());
        }
        if let Ok(dt) = timestamp.parse::<NaiveDateTime>() {
            return Some(dt.hour());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.hour());
        }
        // Date-only input means midnight.
        if timestamp.parse::<NaiveDate>().is_ok() {
            return Some(0);
        }
        None
    }

    fn fallback_hour(&self, meta: &HashMap<String, Value>) -> u32 {
        meta.get("hour")
            .and_then(coerce_hour)
            .unwrap_or_else(|| self.clock.utc_hour())
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce a metadata value to an hour, accepting integers, floats
/// (truncated), and numeric strings. Values outside 0-23 are not usable as an
/// hour and are dropped in favor of the clock.
fn coerce_hour(value: &Value) -> Option<u32> {
    let hour = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u32::try_from(hour).ok().filter(|h| *h <= 23)
}
