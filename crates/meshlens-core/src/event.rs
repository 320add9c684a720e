//! Engine log events

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// One engine log record, exactly as the engine serialized it
///
/// The string is both the payload and the deduplication key: two raw
/// events are the same event iff their bytes are identical. Clones share
/// the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Arc<str>);

impl RawEvent {
    /// Wrap an engine-emitted record
    pub fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    /// The exact record text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawEvent {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for RawEvent {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for RawEvent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RawEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity of a translated event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
    /// Locally injected entry (e.g. the generated engine configuration)
    Config,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Config => write!(f, "CONFIG"),
        }
    }
}

/// A translated, display-ready log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `HH:MM:SS`
    pub time: String,
    pub message: String,
    pub level: EventLevel,
    /// Full original timestamp, used for ordering and row keys
    pub raw_time: String,
}

impl EventRecord {
    /// Create a record
    pub fn new(
        time: impl Into<String>,
        message: impl Into<String>,
        level: EventLevel,
        raw_time: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            message: message.into(),
            level,
            raw_time: raw_time.into(),
        }
    }

    /// Create a locally injected CONFIG entry stamped with the current time
    pub fn config(message: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            time: now.format("%H:%M:%S").to_string(),
            message: message.into(),
            level: EventLevel::Config,
            raw_time: now.to_rfc3339(),
        }
    }

    /// Text shown in the live log view
    ///
    /// CONFIG entries are shown bare; everything else is prefixed with its time.
    pub fn display_text(&self) -> String {
        match self.level {
            EventLevel::Config => self.message.clone(),
            _ => format!("[{}] {}", self.time, self.message),
        }
    }

    /// Line used by the human-readable export
    pub fn export_line(&self) -> String {
        format!("[{}] [{}] {}", self.time, self.level, self.message)
    }
}
