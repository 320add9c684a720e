//! Configuration for the polling session

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default time the engine gets to produce a snapshot
pub const DEFAULT_SNAPSHOT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a [`Monitor`](crate::Monitor)
///
/// Loadable from TOML; missing keys take their defaults:
///
/// ```toml
/// poll_interval_ms = 2000
/// snapshot_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Time between poll cycles
    pub poll_interval_ms: u64,
    /// Timeout handed to the engine for each snapshot fetch
    pub snapshot_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            snapshot_timeout_secs: DEFAULT_SNAPSHOT_TIMEOUT_SECS,
        }
    }
}

impl MonitorConfig {
    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the snapshot fetch timeout
    pub fn with_snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_timeout_secs = timeout.as_secs();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would make the interval timer panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_secs(self.snapshot_timeout_secs)
    }
}
