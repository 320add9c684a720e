//! Published panel state

use meshlens_core::{EngineStatus, EventRecord, NodeSelfInfo, ResolvedPeerView};
use meshlens_events::EventHistory;
use meshlens_topology::TopologyView;

/// Everything the status and log views read, published as one unit
///
/// Readers only ever see a whole `PanelView`, so the peer list and the
/// history always come from the same cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelView {
    /// Engine status from the latest cycle
    pub status: EngineStatus,
    /// Last successfully decoded topology
    pub topology: Option<TopologyView>,
    /// Every event collected during this engine run
    pub history: EventHistory,
    /// Events carried by the last decoded snapshot, translated
    pub snapshot_events: Vec<EventRecord>,
}

impl PanelView {
    /// Local node info, if a snapshot has been decoded
    pub fn node(&self) -> Option<&NodeSelfInfo> {
        self.topology.as_ref().map(|t| &t.node)
    }

    /// Resolved peers, sorted by hostname
    pub fn peers(&self) -> &[ResolvedPeerView] {
        self.topology.as_ref().map(|t| t.peers.as_slice()).unwrap_or_default()
    }

    /// Check whether this is the cleared state
    pub fn is_empty(&self) -> bool {
        self.topology.is_none() && self.history.is_empty() && self.snapshot_events.is_empty()
    }
}
