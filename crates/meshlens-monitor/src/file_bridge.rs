//! Snapshot-file bridge
//!
//! Treats a JSON file on disk as the engine: the engine counts as running
//! while the file exists, and every fetch re-reads it. Useful for watching a
//! snapshot that another process keeps rewriting, and for replaying
//! captured snapshots.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use meshlens_core::{EngineBridge, EngineStatus};

/// An [`EngineBridge`] backed by a snapshot file
#[derive(Debug, Clone)]
pub struct FileBridge {
    path: PathBuf,
    instance_name: String,
}

impl FileBridge {
    /// Create a bridge reading `path` for `instance_name`
    pub fn new(path: impl Into<PathBuf>, instance_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instance_name: instance_name.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl EngineBridge for FileBridge {
    async fn status(&self) -> EngineStatus {
        let running = tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        EngineStatus {
            running,
            instance_name: self.instance_name.clone(),
            ..Default::default()
        }
    }

    async fn collect_snapshot(&self, timeout: Duration) -> Option<String> {
        match tokio::time::timeout(timeout, tokio::fs::read_to_string(&self.path)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                debug!(path = %self.path.display(), error = %e, "Failed to read snapshot file");
                None
            }
            Err(_) => {
                debug!(path = %self.path.display(), "Timed out reading snapshot file");
                None
            }
        }
    }
}
