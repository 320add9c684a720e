//! Error types for profile management

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while managing profiles
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The book must always keep one profile
    #[error("Cannot delete the last profile")]
    LastProfile,

    /// No profile with the given id
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Filesystem error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profile book (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Engine config rendering error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Engine config parsing error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Result type alias for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;
