//! Error types for the polling session

use std::path::PathBuf;

use thiserror::Error;

use meshlens_core::SnapshotError;

/// Errors surfaced by [`Monitor`](crate::Monitor)
///
/// The periodic task absorbs all of these; only a manual refresh reports
/// them to the caller.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// No session is active, or the engine reports it is not running
    #[error("Engine not running")]
    NotRunning,

    /// A session is already active
    #[error("Monitor already running")]
    AlreadyRunning,

    /// The engine produced no snapshot (timeout or fetch failure)
    #[error("Engine returned no snapshot")]
    NoData,

    /// The snapshot could not be decoded
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),
}

/// Errors loading a [`MonitorConfig`](crate::MonitorConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid monitor config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Result type alias for config loading
pub type ConfigResult<T> = Result<T, ConfigError>;
