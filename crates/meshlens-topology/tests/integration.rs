//! Integration tests for snapshot decoding and reconciliation
//!
//! Drives whole snapshot documents through `decode_snapshot` and checks the
//! resolved peer list the status view would show.

use meshlens_core::NOT_APPLICABLE;
use meshlens_topology::decode_snapshot;
use meshlens_topology::fixture::{SnapshotBuilder, conn, route};

/// A small mesh: two direct peers, two peers relayed through them,
/// and one relayed peer whose next hop is not in the route set
fn mixed_mesh() -> String {
    SnapshotBuilder::new("mesh-a")
        .virtual_ipv4(0x0A90_9001, 24)
        .route(route(30, "relay-west", 30))
        .route(route(10, "edge-2", 20).path_latency(80))
        .route(route(20, "relay-east", 20))
        .route(route(40, "edge-1", 30).nat_type(None))
        .route(route(50, "orphan", 999))
        .peer(vec![conn(20, "udp://198.51.100.20:11010", 4_500)])
        .peer(vec![conn(30, "tcp://198.51.100.30:11010", 21_000)])
        .peer(vec![])
        .build()
}

#[test]
fn test_relayed_peer_scenario() {
    let json = SnapshotBuilder::new("mesh-a")
        .route(route(7, "node-b", 3))
        .route(route(3, "node-a", 3))
        .build();

    let snapshot = decode_snapshot(&json, "mesh-a").unwrap();
    let peers = snapshot.resolve_peers();

    let node_b = peers.iter().find(|p| p.hostname == "node-b").unwrap();
    assert!(!node_b.is_direct);
    assert_eq!(node_b.connection_details, "via node-a");
    assert_eq!(node_b.traffic, NOT_APPLICABLE);
}

#[test]
fn test_every_route_resolves_exactly_once() {
    let snapshot = decode_snapshot(&mixed_mesh(), "mesh-a").unwrap();
    let peers = snapshot.resolve_peers();

    assert_eq!(peers.len(), snapshot.routes.len());
    for route in snapshot.routes.iter() {
        let matching = peers.iter().filter(|p| p.peer_id == route.peer_id).count();
        assert_eq!(matching, 1, "peer {} resolved {} times", route.peer_id, matching);
    }
}

#[test]
fn test_direct_classification_follows_connections() {
    let snapshot = decode_snapshot(&mixed_mesh(), "mesh-a").unwrap();

    for peer in snapshot.resolve_peers() {
        assert_eq!(
            peer.is_direct,
            snapshot.connections.contains(peer.peer_id),
            "peer {}",
            peer.hostname
        );
    }
}

#[test]
fn test_relay_details() {
    let snapshot = decode_snapshot(&mixed_mesh(), "mesh-a").unwrap();
    let peers = snapshot.resolve_peers();
    let by_name = |name: &str| peers.iter().find(|p| p.hostname == name).unwrap();

    let edge_2 = by_name("edge-2");
    assert_eq!(edge_2.connection_details, "via relay-east");
    assert_eq!(edge_2.latency, "80 ms (path)");

    let edge_1 = by_name("edge-1");
    assert_eq!(edge_1.connection_details, "via relay-west");
    assert_eq!(edge_1.nat_type.to_string(), "Unknown");

    assert_eq!(by_name("orphan").connection_details, "via unknown");

    let relay_east = by_name("relay-east");
    assert!(relay_east.is_direct);
    assert_eq!(relay_east.connection_details, "udp://198.51.100.20:11010");
    assert_eq!(relay_east.latency, "4 ms");
    assert_eq!(relay_east.traffic, "2.0 KB / 1.0 KB");
}

#[test]
fn test_sorted_by_hostname() {
    let snapshot = decode_snapshot(&mixed_mesh(), "mesh-a").unwrap();
    let peers = snapshot.resolve_peers();

    assert!(peers.windows(2).all(|w| w[0].hostname <= w[1].hostname));
}

#[test]
fn test_reconcile_is_idempotent() {
    let json = mixed_mesh();
    let first = decode_snapshot(&json, "mesh-a").unwrap().topology();
    let second = decode_snapshot(&json, "mesh-a").unwrap().topology();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_empty_mesh() {
    let json = SnapshotBuilder::new("mesh-a").build();
    let topology = decode_snapshot(&json, "mesh-a").unwrap().topology();

    assert_eq!(topology.node.hostname, "self-node");
    assert!(topology.peers.is_empty());
}
