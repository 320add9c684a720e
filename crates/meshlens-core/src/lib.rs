//! # Meshlens Core
//!
//! Core types, formatting helpers and errors shared by the meshlens stack.
//!
//! This crate provides the value types that flow from the engine snapshot
//! into the status and log views, plus the [`EngineBridge`] seam that lets
//! the same polling logic run against the native engine, a snapshot file
//! or the in-memory [`MockEngine`].
//!
//! ## Key Types
//!
//! - [`NodeSelfInfo`]: Identity of the local node as reported by the engine
//! - [`RouteEntry`]: One routing-table row, keyed by [`PeerId`]
//! - [`DirectConnectionEntry`]: One live transport connection to a peer
//! - [`ResolvedPeerView`]: A route joined with its connection, ready for display
//! - [`RawEvent`] / [`EventRecord`]: Raw engine log records and their translation
//! - [`NatType`]: NAT classification codes and their labels
//!
//! ## Key Traits
//!
//! - [`EngineBridge`]: Boundary to the engine (`status`, `collect_snapshot`)

pub mod bridge;
pub mod error;
pub mod event;
pub mod format;
pub mod mock_engine;
pub mod model;
pub mod nat;

// Re-export main types
pub use bridge::*;
pub use error::*;
pub use event::*;
pub use format::*;
pub use mock_engine::*;
pub use model::*;
pub use nat::*;
