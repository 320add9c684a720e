//! Error types for meshlens

use thiserror::Error;

/// Errors raised while decoding a status snapshot
///
/// Any of these aborts the decode for the current cycle; callers keep the
/// previous good state.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Instance `{0}` not present in snapshot")]
    InstanceNotFound(String),

    #[error("Malformed `{section}` section: {source}")]
    Malformed {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while translating a single raw event record
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid event timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Event union has no variant")]
    EmptyEvent,

    #[error("Unexpected payload for `{tag}`: {reason}")]
    Payload { tag: String, reason: String },
}

impl EventError {
    /// Build a payload error for the given variant tag
    pub fn payload(tag: &str, reason: impl Into<String>) -> Self {
        Self::Payload {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for snapshot decoding
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Result type for event translation
pub type EventResult<T> = Result<T, EventError>;
