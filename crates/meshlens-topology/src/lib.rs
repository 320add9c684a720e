//! # Meshlens Topology
//!
//! Turns one engine status snapshot into a stable, display-ready view of
//! the mesh.
//!
//! ## Core Components
//!
//! - [`decode_snapshot`]: Parses the snapshot JSON for one instance into node
//!   info, routes, direct connections and raw events
//! - [`RouteTable`] / [`ConnectionTable`]: Per-snapshot lookup tables keyed by peer id
//! - [`reconcile`]: Joins routes with connections into [`ResolvedPeerView`]s
//!
//! ## Reconciliation
//!
//! The routing table is the authoritative list of nodes that exist. For each
//! route:
//!
//! 1. **DIRECT**: a connection with the same peer id exists; show its remote
//!    address, measured latency and byte counters
//! 2. **RELAY**: no connection; show `via <next hop hostname>`, the route's
//!    path latency and no traffic figures
//!
//! The result is sorted by hostname and rebuilt from scratch on every
//! snapshot; nothing is patched in place.
//!
//! ## Example
//!
//! ```rust,ignore
//! use meshlens_topology::decode_snapshot;
//!
//! let snapshot = decode_snapshot(&json, "mesh-a")?;
//! for peer in snapshot.resolve_peers() {
//!     println!("{} {}", peer.hostname, peer.connection_details);
//! }
//! ```
//!
//! [`ResolvedPeerView`]: meshlens_core::ResolvedPeerView

pub mod decoder;
pub mod fixture;
pub mod reconcile;
pub mod table;

pub use decoder::{DecodedSnapshot, decode_snapshot, extract_raw_events};
pub use reconcile::{TopologyView, reconcile};
pub use table::{ConnectionTable, RouteTable};

// Re-export core types for convenience
pub use meshlens_core::{
    DirectConnectionEntry, NodeSelfInfo, ResolvedPeerView, RouteEntry, SnapshotError,
    SnapshotResult,
};
