//! # Meshlens Monitor
//!
//! Keeps the status and log views current while the engine runs.
//!
//! [`Monitor`] owns one polling session per engine run. Every poll interval
//! it asks the [`EngineBridge`] for status, fetches one snapshot, decodes
//! and reconciles it, absorbs the new events and publishes the result as a
//! single [`PanelView`] over a `watch` channel.
//!
//! ## Guarantees
//!
//! - At most one snapshot fetch is in flight; manual refreshes queue behind
//!   the periodic cycle
//! - A failed cycle keeps the previous topology and history
//! - [`Monitor::stop`] clears the published view before it returns, and a
//!   cycle still running at that point never publishes
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use meshlens_monitor::{FileBridge, Monitor, MonitorConfig};
//!
//! let bridge = Arc::new(FileBridge::new("snapshot.json", "mesh-a"));
//! let monitor = Monitor::new(bridge, MonitorConfig::default());
//! monitor.start("mesh-a").await?;
//!
//! let mut views = monitor.subscribe();
//! while views.changed().await.is_ok() {
//!     let view = views.borrow_and_update().clone();
//!     println!("{} peers", view.peers().len());
//! }
//! ```

mod config;
mod error;
mod file_bridge;
mod poll_task;
mod session;
mod view;

pub use config::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SNAPSHOT_TIMEOUT_SECS, MonitorConfig};
pub use error::{ConfigError, ConfigResult, MonitorError, MonitorResult};
pub use file_bridge::FileBridge;
pub use session::RefreshReport;
pub use view::PanelView;

// Re-export core types for convenience
pub use meshlens_core::{EngineBridge, EngineStatus};

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::poll_task::PollTask;
use crate::session::SessionCore;

struct ActiveSession {
    core: Arc<SessionCore>,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// Polling session driver
pub struct Monitor {
    bridge: Arc<dyn EngineBridge>,
    config: MonitorConfig,
    view_tx: watch::Sender<Arc<PanelView>>,
    session: Mutex<Option<ActiveSession>>,
}

impl Monitor {
    /// Create a monitor; nothing is polled until [`Monitor::start`]
    pub fn new(bridge: Arc<dyn EngineBridge>, config: MonitorConfig) -> Self {
        let (view_tx, _) = watch::channel(Arc::new(PanelView::default()));
        Self {
            bridge,
            config,
            view_tx,
            session: Mutex::new(None),
        }
    }

    /// Start polling for `instance_name`
    ///
    /// The view is reset and the first cycle runs immediately.
    #[instrument(skip(self, instance_name))]
    pub async fn start(&self, instance_name: impl Into<String>) -> MonitorResult<()> {
        let instance_name = instance_name.into();
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }

        self.view_tx.send_replace(Arc::new(PanelView::default()));

        let core = Arc::new(SessionCore::new(
            self.bridge.clone(),
            instance_name.clone(),
            self.config.snapshot_timeout(),
            self.view_tx.clone(),
        ));
        let (shutdown_tx, _) = broadcast::channel(1);
        let task = PollTask::spawn(
            core.clone(),
            self.config.poll_interval(),
            shutdown_tx.subscribe(),
        );

        *slot = Some(ActiveSession {
            core,
            shutdown_tx,
            task,
        });

        info!(instance = %instance_name, "Monitor started");
        Ok(())
    }

    /// Stop polling and clear all session state
    ///
    /// The cleared view is published before the poll task is awaited.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> MonitorResult<()> {
        let Some(session) = self.slot().take() else {
            return Ok(());
        };

        session.core.cancel();
        self.view_tx.send_replace(Arc::new(PanelView::default()));
        let _ = session.shutdown_tx.send(());

        if let Err(e) = session.task.await {
            warn!(error = %e, "Poll task ended abnormally");
        }

        info!(instance = %session.core.instance_name(), "Monitor stopped");
        Ok(())
    }

    /// Check if a session is active
    pub fn is_started(&self) -> bool {
        self.slot().is_some()
    }

    /// Run one cycle now
    ///
    /// Waits for any cycle already in flight, then fetches. Unlike the
    /// periodic task this reports why nothing was updated.
    pub async fn refresh_now(&self) -> MonitorResult<RefreshReport> {
        let core = self.core().ok_or(MonitorError::NotRunning)?;
        core.cycle().await
    }

    /// Current raw snapshot text, fetched through the same gate as polling
    pub async fn raw_snapshot(&self) -> Option<String> {
        let core = self.core()?;
        core.raw_snapshot().await
    }

    /// Subscribe to published views
    pub fn subscribe(&self) -> watch::Receiver<Arc<PanelView>> {
        self.view_tx.subscribe()
    }

    /// Latest published view
    pub fn view(&self) -> Arc<PanelView> {
        self.view_tx.borrow().clone()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn core(&self) -> Option<Arc<SessionCore>> {
        self.slot().as_ref().map(|session| session.core.clone())
    }

    // The slot is never held across an await.
    fn slot(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(session) = self.slot().take() {
            session.core.cancel();
            session.task.abort();
        }
    }
}
