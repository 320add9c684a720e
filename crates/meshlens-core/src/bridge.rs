//! Engine bridge abstraction
//!
//! The engine itself (and its start/stop lifecycle) lives outside meshlens.
//! [`EngineBridge`] is the only way meshlens talks to it, which lets the
//! polling logic run against the native engine, a snapshot file, or the
//! in-memory [`MockEngine`](crate::MockEngine).

use std::time::Duration;

use async_trait::async_trait;

use crate::model::EngineStatus;

/// Read-only boundary to the mesh engine
#[async_trait]
pub trait EngineBridge: Send + Sync {
    /// Current engine status
    ///
    /// Called once per poll cycle regardless of the running state.
    async fn status(&self) -> EngineStatus;

    /// Fetch one full status snapshot as JSON text
    ///
    /// Returns `None` when the engine is not running, the fetch times out,
    /// or the engine fails to produce a document.
    async fn collect_snapshot(&self, timeout: Duration) -> Option<String>;
}
