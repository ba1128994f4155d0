//! Finalized log entry structure
//!
//! A `LogEntry` is what handlers receive: layered fields already flattened
//! into one ordered batch, stamped with level, message and timestamp.

use super::error::Result;
use super::field::Fields;
use super::log_level::LogLevel;
use super::pool::FieldPool;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where an entry's storage came from, and who may reclaim it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Drawn from the entry pool; the logger reclaims it after delivery.
    Pooled,
    /// Allocated for the receiver to keep; never returned to a pool.
    #[default]
    Retained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub fields: Fields,
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(skip)]
    origin: Origin,
}

/// `0001-01-01T00:00:00Z`, the timestamp of an entry never stamped.
fn zero_timestamp() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl LogEntry {
    /// A retained entry, safe to keep indefinitely.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            fields: Fields::new(),
            level,
            timestamp: zero_timestamp(),
            message: message.into(),
            origin: Origin::Retained,
        }
    }

    pub(crate) fn empty(origin: Origin) -> Self {
        Self {
            fields: Fields::new(),
            level: LogLevel::default(),
            timestamp: zero_timestamp(),
            message: String::new(),
            origin,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Empty the entry for reuse, handing its fields back to `fields`.
    pub(crate) fn clear(&mut self, fields: &FieldPool) {
        for field in self.fields.drain_shared() {
            fields.release(field);
        }
        self.message.clear();
        self.level = LogLevel::default();
        self.timestamp = zero_timestamp();
    }

    /// Encode as a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode an entry; nothing is produced unless the whole input is valid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
