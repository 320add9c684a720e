//! Snapshot data model
//!
//! Every value here is rebuilt from scratch on each decoded snapshot and
//! never mutated afterwards.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::nat::NatType;

/// Engine-assigned peer identifier
pub type PeerId = u64;

/// Shown when the local node has no virtual address yet
pub const UNASSIGNED: &str = "unassigned";

/// Shown for routes that carry no virtual IP
pub const NO_VIRTUAL_IP: &str = "no virtual IP";

/// Shown when the node has no public address
pub const NO_PUBLIC_ADDR: &str = "N/A";

/// Traffic column for relayed peers
pub const NOT_APPLICABLE: &str = "not applicable";

/// Next-hop label when the hop is missing from the route set
pub const UNKNOWN_HOP: &str = "unknown";

/// A virtual address with its network prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualAddr {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl std::fmt::Display for VirtualAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Identity of the local node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSelfInfo {
    pub hostname: String,
    pub version: String,
    /// `None` until the engine has assigned an address
    pub virtual_addr: Option<VirtualAddr>,
    pub public_addrs: Vec<String>,
    pub nat_type: NatType,
    pub listeners: Vec<String>,
    pub interface_addrs: Vec<Ipv4Addr>,
}

impl NodeSelfInfo {
    /// Virtual address as `a.b.c.d/len`, or [`UNASSIGNED`]
    pub fn virtual_addr_label(&self) -> String {
        self.virtual_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| UNASSIGNED.to_string())
    }

    /// Public addresses joined by `", "`, or [`NO_PUBLIC_ADDR`]
    pub fn public_addrs_label(&self) -> String {
        if self.public_addrs.is_empty() {
            NO_PUBLIC_ADDR.to_string()
        } else {
            self.public_addrs.join(", ")
        }
    }
}

/// One row of the engine routing table
///
/// The routing table enumerates every node known anywhere in the mesh,
/// including nodes reachable only through a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub peer_id: PeerId,
    pub hostname: String,
    pub virtual_ip: Option<Ipv4Addr>,
    pub next_hop_peer_id: PeerId,
    pub path_latency_ms: u32,
    pub cost: i32,
    pub version: String,
    pub nat_type: NatType,
    pub instance_id: String,
}

impl RouteEntry {
    /// Virtual IP as text, or [`NO_VIRTUAL_IP`]
    pub fn virtual_ip_label(&self) -> String {
        self.virtual_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| NO_VIRTUAL_IP.to_string())
    }
}

/// An active transport connection to a peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectConnectionEntry {
    pub peer_id: PeerId,
    pub remote_addr: String,
    pub latency_us: u64,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// A route joined with its direct connection (if any), ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeerView {
    pub hostname: String,
    pub virtual_ip: String,
    pub is_direct: bool,
    /// Remote address when direct, `via <hostname>` when relayed
    pub connection_details: String,
    pub latency: String,
    pub traffic: String,
    pub version: String,
    pub nat_type: NatType,
    pub cost: i32,
    pub next_hop_peer_id: PeerId,
    pub peer_id: PeerId,
    pub instance_id: String,
}

/// Engine status as reported by the bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub running: bool,
    pub instance_name: String,
    pub virtual_ipv4: Option<String>,
    pub proxy_cidrs: Vec<String>,
}

impl EngineStatus {
    /// Status of an engine that is not running
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Status of a running engine for the given instance
    pub fn running(instance_name: impl Into<String>) -> Self {
        Self {
            running: true,
            instance_name: instance_name.into(),
            ..Default::default()
        }
    }
}
