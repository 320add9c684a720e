//! Route/connection reconciliation
//!
//! Pure and stateless: the same tables always produce the same list.

use serde::{Deserialize, Serialize};

use meshlens_core::{
    DirectConnectionEntry, NOT_APPLICABLE, NodeSelfInfo, ResolvedPeerView, RouteEntry,
    UNKNOWN_HOP, format_latency_us, format_path_latency, format_traffic,
};

use crate::table::{ConnectionTable, RouteTable};

/// Everything the status view shows for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyView {
    pub node: NodeSelfInfo,
    /// Sorted by hostname
    pub peers: Vec<ResolvedPeerView>,
}

/// Resolve one view per route, sorted by hostname
///
/// A route with a matching connection is direct; every other route is
/// relayed through its next hop.
pub fn reconcile(routes: &RouteTable, connections: &ConnectionTable) -> Vec<ResolvedPeerView> {
    let mut peers: Vec<ResolvedPeerView> = routes
        .iter()
        .map(|route| match connections.get(route.peer_id) {
            Some(connection) => direct_view(route, connection),
            None => relay_view(route, routes),
        })
        .collect();

    peers.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    peers
}

fn direct_view(route: &RouteEntry, connection: &DirectConnectionEntry) -> ResolvedPeerView {
    ResolvedPeerView {
        is_direct: true,
        connection_details: connection.remote_addr.clone(),
        latency: format_latency_us(connection.latency_us),
        traffic: format_traffic(connection.rx_bytes, connection.tx_bytes),
        ..base_view(route)
    }
}

fn relay_view(route: &RouteEntry, routes: &RouteTable) -> ResolvedPeerView {
    let next_hop = routes
        .hostname_of(route.next_hop_peer_id)
        .unwrap_or(UNKNOWN_HOP);

    ResolvedPeerView {
        is_direct: false,
        connection_details: format!("via {}", next_hop),
        latency: format_path_latency(route.path_latency_ms),
        traffic: NOT_APPLICABLE.to_string(),
        ..base_view(route)
    }
}

fn base_view(route: &RouteEntry) -> ResolvedPeerView {
    ResolvedPeerView {
        hostname: route.hostname.clone(),
        virtual_ip: route.virtual_ip_label(),
        is_direct: false,
        connection_details: String::new(),
        latency: String::new(),
        traffic: String::new(),
        version: route.version.clone(),
        nat_type: route.nat_type,
        cost: route.cost,
        next_hop_peer_id: route.next_hop_peer_id,
        peer_id: route.peer_id,
        instance_id: route.instance_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlens_core::{NatType, PeerId};
    use std::net::Ipv4Addr;

    fn make_route(peer_id: PeerId, hostname: &str, next_hop: PeerId) -> RouteEntry {
        RouteEntry {
            peer_id,
            hostname: hostname.to_string(),
            virtual_ip: Some(Ipv4Addr::new(10, 0, 0, peer_id as u8)),
            next_hop_peer_id: next_hop,
            path_latency_ms: 35,
            cost: if peer_id == next_hop { 1 } else { 2 },
            version: "2.3.0".into(),
            nat_type: NatType::PortRestrictedCone,
            instance_id: format!("inst-{}", peer_id),
        }
    }

    fn make_conn(peer_id: PeerId) -> DirectConnectionEntry {
        DirectConnectionEntry {
            peer_id,
            remote_addr: format!("tcp://198.51.100.{}:11010", peer_id),
            latency_us: 12_345,
            rx_bytes: 1536,
            tx_bytes: 100,
        }
    }

    #[test]
    fn test_direct_peer() {
        let routes: RouteTable = [make_route(3, "node-a", 3)].into_iter().collect();
        let conns: ConnectionTable = [make_conn(3)].into_iter().collect();

        let peers = reconcile(&routes, &conns);
        assert_eq!(peers.len(), 1);
        let peer = &peers[0];
        assert!(peer.is_direct);
        assert_eq!(peer.connection_details, "tcp://198.51.100.3:11010");
        assert_eq!(peer.latency, "12 ms");
        assert_eq!(peer.traffic, "1.5 KB / 100 B");
        assert_eq!(peer.virtual_ip, "10.0.0.3");
        assert_eq!(peer.instance_id, "inst-3");
    }

    #[test]
    fn test_relayed_peer() {
        let routes: RouteTable = [make_route(7, "node-b", 3), make_route(3, "node-a", 3)]
            .into_iter()
            .collect();
        let conns: ConnectionTable = [make_conn(3)].into_iter().collect();

        let peers = reconcile(&routes, &conns);
        let node_b = peers.iter().find(|p| p.peer_id == 7).unwrap();
        assert!(!node_b.is_direct);
        assert_eq!(node_b.connection_details, "via node-a");
        assert_eq!(node_b.latency, "35 ms (path)");
        assert_eq!(node_b.traffic, NOT_APPLICABLE);
        assert_eq!(node_b.next_hop_peer_id, 3);
    }

    #[test]
    fn test_missing_next_hop() {
        let routes: RouteTable = [make_route(7, "node-b", 99)].into_iter().collect();
        let peers = reconcile(&routes, &ConnectionTable::new());
        assert_eq!(peers[0].connection_details, "via unknown");
    }

    #[test]
    fn test_sorted_by_hostname() {
        let routes: RouteTable = [
            make_route(1, "zulu", 1),
            make_route(2, "alpha", 1),
            make_route(3, "mike", 1),
        ]
        .into_iter()
        .collect();

        let hostnames: Vec<_> = reconcile(&routes, &ConnectionTable::new())
            .into_iter()
            .map(|p| p.hostname)
            .collect();
        assert_eq!(hostnames, vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn test_connection_without_route_is_ignored() {
        let routes = RouteTable::new();
        let conns: ConnectionTable = [make_conn(3)].into_iter().collect();
        assert!(reconcile(&routes, &conns).is_empty());
    }
}
