//! Snapshot decoding
//!
//! The engine reports all running instances in one document:
//!
//! ```text
//! { "map": { "<instance>": { "my_node_info": {..}, "routes": [..],
//!                            "peers": [..], "events": ["<json>", ..] } } }
//! ```
//!
//! Each `events` element is itself a JSON-encoded string. Those strings are
//! kept verbatim as [`RawEvent`]s because the log collector uses their exact
//! bytes as a cursor; they are only parsed when displayed.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use meshlens_core::{
    DirectConnectionEntry, NatType, NodeSelfInfo, RawEvent, RouteEntry, SnapshotError,
    SnapshotResult, VirtualAddr, packed_ipv4,
};

use crate::reconcile::{TopologyView, reconcile};
use crate::table::{ConnectionTable, RouteTable};

/// One instance's section of a snapshot, decoded
#[derive(Debug, Clone)]
pub struct DecodedSnapshot {
    pub node: NodeSelfInfo,
    pub routes: RouteTable,
    pub connections: ConnectionTable,
    /// Raw event records, oldest first
    pub raw_events: Vec<RawEvent>,
}

impl DecodedSnapshot {
    /// Resolve the peer list for this snapshot
    pub fn resolve_peers(&self) -> Vec<meshlens_core::ResolvedPeerView> {
        reconcile(&self.routes, &self.connections)
    }

    /// Node info plus resolved peers
    pub fn topology(&self) -> TopologyView {
        TopologyView {
            node: self.node.clone(),
            peers: self.resolve_peers(),
        }
    }
}

/// Decode the section for `instance_name` from a snapshot document
///
/// Fails with a [`SnapshotError`] when the document is not JSON, the
/// instance is absent, or any required section is missing or malformed.
/// Nothing is produced on failure.
pub fn decode_snapshot(json: &str, instance_name: &str) -> SnapshotResult<DecodedSnapshot> {
    let mut instance = instance_section(json, instance_name)?;

    let node: WireNodeInfo = take_section(&mut instance, "my_node_info")?;
    let routes: Vec<WireRoute> = take_section(&mut instance, "routes")?;
    let peers: Vec<WirePeer> = take_section(&mut instance, "peers")?;
    let events: Vec<String> = take_section(&mut instance, "events")?;

    let routes: RouteTable = routes.into_iter().map(RouteEntry::from).collect();

    let mut connections = ConnectionTable::new();
    for peer in peers {
        if let Some(connection) = peer.first_connection()? {
            connections.insert(connection);
        }
    }

    let snapshot = DecodedSnapshot {
        node: node.into(),
        routes,
        connections,
        raw_events: oldest_first(events),
    };

    debug!(
        instance = instance_name,
        routes = snapshot.routes.len(),
        direct = snapshot.connections.len(),
        events = snapshot.raw_events.len(),
        "Decoded snapshot"
    );

    Ok(snapshot)
}

/// Extract only the raw event records for `instance_name`, oldest first
///
/// Lighter than [`decode_snapshot`]: node info, routes and peers are not
/// inspected.
pub fn extract_raw_events(json: &str, instance_name: &str) -> SnapshotResult<Vec<RawEvent>> {
    let mut instance = instance_section(json, instance_name)?;
    let events: Vec<String> = take_section(&mut instance, "events")?;
    Ok(oldest_first(events))
}

fn instance_section(json: &str, instance_name: &str) -> SnapshotResult<Map<String, Value>> {
    let mut root: Value = serde_json::from_str(json)?;

    let map = root
        .get_mut("map")
        .and_then(Value::as_object_mut)
        .ok_or(SnapshotError::MissingField("map"))?;

    match map.remove(instance_name) {
        Some(Value::Object(instance)) => Ok(instance),
        Some(_) => Err(SnapshotError::MissingField("map.<instance>")),
        None => Err(SnapshotError::InstanceNotFound(instance_name.to_string())),
    }
}

fn take_section<T: DeserializeOwned>(
    instance: &mut Map<String, Value>,
    section: &'static str,
) -> SnapshotResult<T> {
    let value = instance
        .remove(section)
        .ok_or(SnapshotError::MissingField(section))?;
    serde_json::from_value(value).map_err(|source| SnapshotError::Malformed { section, source })
}

// The engine buffers events newest first.
fn oldest_first(events: Vec<String>) -> Vec<RawEvent> {
    events.into_iter().rev().map(RawEvent::from).collect()
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct WireAddr {
    addr: i64,
}

#[derive(Debug, Deserialize)]
struct WireInet {
    address: WireAddr,
    network_length: u8,
}

impl From<WireInet> for VirtualAddr {
    fn from(inet: WireInet) -> Self {
        VirtualAddr {
            address: packed_ipv4(inet.address.addr),
            prefix_len: inet.network_length,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUrl {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireStunInfo {
    #[serde(default)]
    public_ip: Vec<String>,
    #[serde(default)]
    udp_nat_type: i64,
}

#[derive(Debug, Deserialize)]
struct WireIps {
    #[serde(default)]
    interface_ipv4s: Vec<WireAddr>,
}

#[derive(Debug, Deserialize)]
struct WireNodeInfo {
    hostname: String,
    version: String,
    #[serde(default)]
    virtual_ipv4: Option<WireInet>,
    ips: WireIps,
    stun_info: WireStunInfo,
    #[serde(default)]
    listeners: Vec<WireUrl>,
}

impl From<WireNodeInfo> for NodeSelfInfo {
    fn from(node: WireNodeInfo) -> Self {
        NodeSelfInfo {
            hostname: node.hostname,
            version: node.version,
            virtual_addr: node.virtual_ipv4.map(VirtualAddr::from),
            public_addrs: node.stun_info.public_ip,
            nat_type: NatType::from_code(node.stun_info.udp_nat_type),
            listeners: node.listeners.into_iter().map(|l| l.url).collect(),
            interface_addrs: node
                .ips
                .interface_ipv4s
                .into_iter()
                .map(|a| packed_ipv4(a.addr))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    peer_id: u64,
    hostname: String,
    #[serde(default)]
    ipv4_addr: Option<WireInet>,
    next_hop_peer_id: u64,
    path_latency: u32,
    cost: i32,
    version: String,
    #[serde(default)]
    stun_info: Option<WireStunInfo>,
    inst_id: String,
}

impl From<WireRoute> for RouteEntry {
    fn from(route: WireRoute) -> Self {
        RouteEntry {
            peer_id: route.peer_id,
            hostname: route.hostname,
            virtual_ip: route.ipv4_addr.map(|inet| packed_ipv4(inet.address.addr)),
            next_hop_peer_id: route.next_hop_peer_id,
            path_latency_ms: route.path_latency,
            cost: route.cost,
            version: route.version,
            nat_type: NatType::from_code(route.stun_info.unwrap_or_default().udp_nat_type),
            instance_id: route.inst_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePeer {
    #[serde(default)]
    conns: Vec<Value>,
}

impl WirePeer {
    /// Only the first connection of a peer is used; the rest are not decoded.
    fn first_connection(self) -> SnapshotResult<Option<DirectConnectionEntry>> {
        let Some(first) = self.conns.into_iter().next() else {
            return Ok(None);
        };
        let conn: WireConn = serde_json::from_value(first)
            .map_err(|source| SnapshotError::Malformed { section: "peers", source })?;
        Ok(Some(conn.into()))
    }
}

#[derive(Debug, Deserialize)]
struct WireTunnel {
    remote_addr: WireUrl,
}

#[derive(Debug, Deserialize)]
struct WireStats {
    latency_us: u64,
    rx_bytes: u64,
    tx_bytes: u64,
}

#[derive(Debug, Deserialize)]
struct WireConn {
    peer_id: u64,
    tunnel: WireTunnel,
    stats: WireStats,
}

impl From<WireConn> for DirectConnectionEntry {
    fn from(conn: WireConn) -> Self {
        DirectConnectionEntry {
            peer_id: conn.peer_id,
            remote_addr: conn.tunnel.remote_addr.url,
            latency_us: conn.stats.latency_us,
            rx_bytes: conn.stats.rx_bytes,
            tx_bytes: conn.stats.tx_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::fixture::{SnapshotBuilder, conn, route};

    #[test]
    fn test_decode_node_info() {
        let json = SnapshotBuilder::new("mesh-a")
            .virtual_ipv4(0x0A90_9001, 24)
            .public_ip("203.0.113.9")
            .nat_type(3)
            .listener("tcp://0.0.0.0:11010")
            .interface_ipv4(0xC0A8_0102)
            .build();

        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        let node = &snapshot.node;
        assert_eq!(node.hostname, "self-node");
        assert_eq!(node.virtual_addr_label(), "10.144.144.1/24");
        assert_eq!(node.public_addrs, vec!["203.0.113.9".to_string()]);
        assert_eq!(node.nat_type, NatType::FullCone);
        assert_eq!(node.listeners, vec!["tcp://0.0.0.0:11010".to_string()]);
        assert_eq!(node.interface_addrs, vec![Ipv4Addr::new(192, 168, 1, 2)]);
    }

    #[test]
    fn test_unassigned_virtual_address() {
        let json = SnapshotBuilder::new("mesh-a").build();
        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        assert!(snapshot.node.virtual_addr.is_none());
        assert_eq!(snapshot.node.virtual_addr_label(), "unassigned");
    }

    #[test]
    fn test_route_without_virtual_ip() {
        let json = SnapshotBuilder::new("mesh-a")
            .route(route(7, "node-b", 3).without_ip())
            .build();
        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        let route = snapshot.routes.get(7).unwrap();
        assert!(route.virtual_ip.is_none());
        assert_eq!(route.virtual_ip_label(), "no virtual IP");
    }

    #[test]
    fn test_first_connection_wins() {
        let json = SnapshotBuilder::new("mesh-a")
            .route(route(7, "node-b", 7))
            .peer(vec![
                conn(7, "tcp://198.51.100.7:11010", 4_000),
                conn(7, "udp://198.51.100.7:11010", 1_000),
            ])
            .build();
        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        let direct = snapshot.connections.get(7).unwrap();
        assert_eq!(direct.remote_addr, "tcp://198.51.100.7:11010");
        assert_eq!(direct.latency_us, 4_000);
    }

    #[test]
    fn test_peer_without_connections_is_skipped() {
        let json = SnapshotBuilder::new("mesh-a")
            .route(route(7, "node-b", 3))
            .peer(vec![])
            .build();
        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        assert!(snapshot.connections.is_empty());
    }

    #[test]
    fn test_events_are_reversed_to_oldest_first() {
        let json = SnapshotBuilder::new("mesh-a")
            .raw_events_newest_first(["c", "b", "a"])
            .build();
        let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
        let raw: Vec<_> = snapshot.raw_events.iter().map(|e| e.as_str()).collect();
        assert_eq!(raw, vec!["a", "b", "c"]);

        let extracted = extract_raw_events(&json, "mesh-a").unwrap();
        assert_eq!(extracted, snapshot.raw_events);
    }

    #[test]
    fn test_missing_instance() {
        let json = SnapshotBuilder::new("mesh-a").build();
        let err = decode_snapshot(&json, "mesh-b").unwrap_err();
        assert!(matches!(err, SnapshotError::InstanceNotFound(name) if name == "mesh-b"));
    }

    #[test]
    fn test_missing_map() {
        let err = decode_snapshot(r#"{"other":{}}"#, "mesh-a").unwrap_err();
        assert!(matches!(err, SnapshotError::MissingField("map")));
    }

    #[test]
    fn test_missing_section() {
        let json = r#"{"map":{"mesh-a":{"my_node_info":{},"routes":[],"peers":[]}}}"#;
        let err = extract_raw_events(json, "mesh-a").unwrap_err();
        assert!(matches!(err, SnapshotError::MissingField("events")));
    }

    #[test]
    fn test_malformed_route() {
        let json = r#"{"map":{"mesh-a":{
            "my_node_info":{"hostname":"h","version":"v","ips":{},"stun_info":{},"listeners":[]},
            "routes":[{"peer_id":"seven"}],
            "peers":[],
            "events":[]}}}"#;
        let err = decode_snapshot(json, "mesh-a").unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { section: "routes", .. }));
    }

    #[test]
    fn test_not_json() {
        let err = decode_snapshot("not json", "mesh-a").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }
}
