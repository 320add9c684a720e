//! Session state and the poll cycle
//!
//! One [`SessionCore`] exists per start/stop of the engine. Its state mutex
//! doubles as the fetch gate: a cycle holds it from the status call until
//! the new view is published, so a manual refresh and the periodic task can
//! never have two fetches in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use meshlens_core::{EngineBridge, EngineStatus, EventRecord, RawEvent};
use meshlens_events::{Absorbed, EventHistory, translate_batch};
use meshlens_topology::{TopologyView, decode_snapshot};

use crate::error::{MonitorError, MonitorResult};
use crate::view::PanelView;

/// Outcome of one successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// How the snapshot's events were absorbed into the history
    pub absorbed: Absorbed,
    /// Number of resolved peers
    pub peers: usize,
    /// History length after the cycle
    pub history_len: usize,
}

#[derive(Default)]
struct SessionState {
    status: EngineStatus,
    topology: Option<TopologyView>,
    history: EventHistory,
    snapshot_events: Vec<EventRecord>,
    /// Raw form of `snapshot_events`
    snapshot_raw: Vec<RawEvent>,
}

impl SessionState {
    /// Compare against a published view without cloning the history
    ///
    /// The history only grows within a session, so equal length and equal
    /// newest record mean equal content.
    fn matches(&self, view: &PanelView) -> bool {
        self.status == view.status
            && self.history.len() == view.history.len()
            && self.history.last() == view.history.last()
            && self.topology == view.topology
            && self.snapshot_events == view.snapshot_events
    }

    /// Retranslate the snapshot's events only when the engine's buffer changed
    ///
    /// An unchanged buffer would otherwise re-log the same skipped records
    /// on every cycle.
    fn set_snapshot_events(&mut self, raw_events: Vec<RawEvent>) {
        if raw_events == self.snapshot_raw {
            return;
        }
        self.snapshot_events = translate_batch(&raw_events);
        self.snapshot_raw = raw_events;
    }

    fn to_view(&self) -> PanelView {
        PanelView {
            status: self.status.clone(),
            topology: self.topology.clone(),
            history: self.history.clone(),
            snapshot_events: self.snapshot_events.clone(),
        }
    }
}

pub(crate) struct SessionCore {
    bridge: Arc<dyn EngineBridge>,
    instance_name: String,
    snapshot_timeout: Duration,
    state: Mutex<SessionState>,
    view_tx: watch::Sender<Arc<PanelView>>,
    cancelled: AtomicBool,
}

impl SessionCore {
    pub(crate) fn new(
        bridge: Arc<dyn EngineBridge>,
        instance_name: String,
        snapshot_timeout: Duration,
        view_tx: watch::Sender<Arc<PanelView>>,
    ) -> Self {
        Self {
            bridge,
            instance_name,
            snapshot_timeout,
            state: Mutex::new(SessionState::default()),
            view_tx,
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Mark the session dead; nothing it does afterwards is published
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run one status + fetch + decode + collect cycle
    ///
    /// On any failure the previous topology and history are kept; only the
    /// engine status is refreshed.
    pub(crate) async fn cycle(&self) -> MonitorResult<RefreshReport> {
        let mut state = self.state.lock().await;
        if self.is_cancelled() {
            return Err(MonitorError::NotRunning);
        }

        state.status = self.bridge.status().await;
        if !state.status.running {
            debug!(instance = %self.instance_name, "Engine not running, skipping fetch");
            self.publish(&state);
            return Err(MonitorError::NotRunning);
        }

        let Some(raw) = self.bridge.collect_snapshot(self.snapshot_timeout).await else {
            debug!(instance = %self.instance_name, "Engine returned no snapshot");
            self.publish(&state);
            return Err(MonitorError::NoData);
        };

        let snapshot = match decode_snapshot(&raw, &self.instance_name) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(instance = %self.instance_name, error = %e, "Malformed snapshot, keeping previous state");
                self.publish(&state);
                return Err(e.into());
            }
        };

        let absorbed = state.history.absorb(&snapshot.raw_events);
        let topology = snapshot.topology();
        let peers = topology.peers.len();
        state.topology = Some(topology);
        state.set_snapshot_events(snapshot.raw_events);

        self.publish(&state);

        let report = RefreshReport {
            absorbed,
            peers,
            history_len: state.history.len(),
        };
        debug!(
            instance = %self.instance_name,
            peers = report.peers,
            appended = report.absorbed.appended(),
            history = report.history_len,
            "Poll cycle complete"
        );
        Ok(report)
    }

    /// Fetch the current snapshot text without touching session state
    pub(crate) async fn raw_snapshot(&self) -> Option<String> {
        let _gate = self.state.lock().await;
        if self.is_cancelled() {
            return None;
        }
        self.bridge.collect_snapshot(self.snapshot_timeout).await
    }

    fn publish(&self, state: &SessionState) {
        self.view_tx.send_if_modified(|current| {
            // Checked under the channel lock so a concurrent stop always wins.
            if self.is_cancelled() {
                return false;
            }
            if state.matches(current) {
                return false;
            }
            *current = Arc::new(state.to_view());
            true
        });
    }
}
