//! Mock engine for testing
//!
//! Provides a scriptable in-memory [`EngineBridge`] so polling and
//! collection logic can be exercised without the native engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meshlens_core::{EngineBridge, MockEngine};
//!
//! let engine = MockEngine::running("mesh-a");
//! engine.set_snapshot(Some(snapshot_json));
//!
//! let status = engine.status().await;
//! assert!(status.running);
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::bridge::EngineBridge;
use crate::model::EngineStatus;

/// A scriptable engine
///
/// The status and the snapshot text are set directly by the test. Fetches
/// can be slowed down with [`MockEngine::with_fetch_delay`] to observe
/// overlapping callers; [`MockEngine::max_concurrent_fetches`] reports the
/// highest number of fetches that were ever in flight at once.
pub struct MockEngine {
    status: Mutex<EngineStatus>,
    snapshot: Mutex<Option<String>>,
    fetch_delay: Duration,
    fetch_calls: AtomicUsize,
    status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockEngine {
    /// Create a mock engine that is not running
    pub fn new() -> Self {
        Self::with_status(EngineStatus::stopped())
    }

    /// Create a mock engine that reports a running instance
    pub fn running(instance_name: impl Into<String>) -> Self {
        Self::with_status(EngineStatus::running(instance_name))
    }

    /// Create a mock engine with an explicit status
    pub fn with_status(status: EngineStatus) -> Self {
        Self {
            status: Mutex::new(status),
            snapshot: Mutex::new(None),
            fetch_delay: Duration::ZERO,
            fetch_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every snapshot fetch by the given duration
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Replace the reported status
    pub fn set_status(&self, status: EngineStatus) {
        *lock(&self.status) = status;
    }

    /// Flip the running flag, keeping the rest of the status
    pub fn set_running(&self, running: bool) {
        lock(&self.status).running = running;
    }

    /// Replace the snapshot returned by the next fetches
    pub fn set_snapshot(&self, snapshot: Option<String>) {
        *lock(&self.snapshot) = snapshot;
    }

    /// Number of snapshot fetches so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of status calls so far
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that overlapped in time
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineBridge for MockEngine {
    async fn status(&self) -> EngineStatus {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.status).clone()
    }

    async fn collect_snapshot(&self, _timeout: Duration) -> Option<String> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        if lock(&self.status).running {
            lock(&self.snapshot).clone()
        } else {
            None
        }
    }
}

/// Counts one fetch as in flight until dropped, including when the fetch
/// future is abandoned mid-delay
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(in_flight: &'a AtomicUsize, max_in_flight: &AtomicUsize) -> Self {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// A poisoned lock only means a test panicked mid-update; the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
