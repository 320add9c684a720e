//! Per-snapshot lookup tables
//!
//! [`RouteTable`] and [`ConnectionTable`] index one snapshot's routes and
//! direct connections by peer id. Both keep insertion order so that
//! reconciling the same snapshot twice walks the entries identically.

use std::collections::HashMap;

use meshlens_core::{DirectConnectionEntry, PeerId, RouteEntry};
use tracing::warn;

/// Routing-table rows of one snapshot, keyed by peer id
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
    index: HashMap<PeerId, usize>,
}

impl RouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route
    ///
    /// Peer ids are unique within a snapshot; if the engine ever repeats
    /// one, the first row is kept and `false` is returned.
    pub fn insert(&mut self, route: RouteEntry) -> bool {
        if self.index.contains_key(&route.peer_id) {
            warn!(peer_id = route.peer_id, "Duplicate route in snapshot, keeping first");
            return false;
        }
        self.index.insert(route.peer_id, self.routes.len());
        self.routes.push(route);
        true
    }

    /// Get the route for a peer
    pub fn get(&self, peer_id: PeerId) -> Option<&RouteEntry> {
        self.index.get(&peer_id).map(|&i| &self.routes[i])
    }

    /// Hostname of a peer, if it is in the table
    pub fn hostname_of(&self, peer_id: PeerId) -> Option<&str> {
        self.get(peer_id).map(|route| route.hostname.as_str())
    }

    /// Check whether a peer is in the table
    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.index.contains_key(&peer_id)
    }

    /// Iterate routes in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<RouteEntry> for RouteTable {
    fn from_iter<T: IntoIterator<Item = RouteEntry>>(iter: T) -> Self {
        let mut table = Self::new();
        for route in iter {
            table.insert(route);
        }
        table
    }
}

/// Direct connections of one snapshot, keyed by peer id
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: HashMap<PeerId, DirectConnectionEntry>,
}

impl ConnectionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection unless the peer already has one
    ///
    /// First wins: a later connection for the same peer is ignored and
    /// `false` is returned.
    pub fn insert(&mut self, connection: DirectConnectionEntry) -> bool {
        match self.connections.entry(connection.peer_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(connection);
                true
            }
        }
    }

    /// Get the direct connection for a peer
    pub fn get(&self, peer_id: PeerId) -> Option<&DirectConnectionEntry> {
        self.connections.get(&peer_id)
    }

    /// Check whether a peer is directly connected
    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.connections.contains_key(&peer_id)
    }

    /// Number of directly connected peers
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl FromIterator<DirectConnectionEntry> for ConnectionTable {
    fn from_iter<T: IntoIterator<Item = DirectConnectionEntry>>(iter: T) -> Self {
        let mut table = Self::new();
        for connection in iter {
            table.insert(connection);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlens_core::NatType;

    fn make_route(peer_id: PeerId, hostname: &str) -> RouteEntry {
        RouteEntry {
            peer_id,
            hostname: hostname.to_string(),
            virtual_ip: None,
            next_hop_peer_id: peer_id,
            path_latency_ms: 1,
            cost: 1,
            version: "2.3.0".into(),
            nat_type: NatType::Unknown,
            instance_id: format!("inst-{}", peer_id),
        }
    }

    fn make_conn(peer_id: PeerId, remote_addr: &str) -> DirectConnectionEntry {
        DirectConnectionEntry {
            peer_id,
            remote_addr: remote_addr.to_string(),
            latency_us: 1000,
            rx_bytes: 0,
            tx_bytes: 0,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = RouteTable::new();
        assert!(table.insert(make_route(3, "node-a")));

        assert!(table.contains(3));
        assert_eq!(table.hostname_of(3), Some("node-a"));
        assert!(table.get(4).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_route_keeps_first() {
        let mut table = RouteTable::new();
        table.insert(make_route(3, "node-a"));
        assert!(!table.insert(make_route(3, "node-z")));

        assert_eq!(table.len(), 1);
        assert_eq!(table.hostname_of(3), Some("node-a"));
    }

    #[test]
    fn test_iter_preserves_order() {
        let table: RouteTable = [make_route(9, "c"), make_route(1, "a"), make_route(5, "b")]
            .into_iter()
            .collect();
        let ids: Vec<_> = table.iter().map(|r| r.peer_id).collect();
        assert_eq!(ids, vec![9, 1, 5]);
    }

    #[test]
    fn test_connection_first_wins() {
        let mut table = ConnectionTable::new();
        assert!(table.insert(make_conn(7, "tcp://1.1.1.1:11010")));
        assert!(!table.insert(make_conn(7, "udp://2.2.2.2:11010")));

        assert_eq!(table.get(7).unwrap().remote_addr, "tcp://1.1.1.1:11010");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_tables() {
        assert!(RouteTable::new().is_empty());
        assert!(ConnectionTable::new().is_empty());
        assert!(!ConnectionTable::new().contains(1));
    }
}
