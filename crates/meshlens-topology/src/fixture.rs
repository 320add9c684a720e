//! Snapshot fixtures for tests
//!
//! Builds engine-shaped snapshot JSON so tests across the workspace can
//! describe a mesh in a few lines instead of hand-writing documents.
//!
//! ```rust,ignore
//! use meshlens_topology::fixture::{SnapshotBuilder, conn, route};
//!
//! let json = SnapshotBuilder::new("mesh-a")
//!     .route(route(3, "node-a", 3))
//!     .route(route(7, "node-b", 3))
//!     .peer(vec![conn(3, "tcp://198.51.100.3:11010", 9_000)])
//!     .build();
//! ```

use serde_json::{Value, json};

/// One routing-table row in wire form
#[derive(Debug, Clone)]
pub struct RouteFixture {
    peer_id: u64,
    hostname: String,
    next_hop_peer_id: u64,
    ipv4: Option<i64>,
    path_latency: u32,
    cost: i32,
    nat_type: Option<i64>,
}

/// Route to `peer_id` through `next_hop_peer_id`
///
/// The virtual IP defaults to `10.144.144.<peer_id>`.
pub fn route(peer_id: u64, hostname: &str, next_hop_peer_id: u64) -> RouteFixture {
    RouteFixture {
        peer_id,
        hostname: hostname.to_string(),
        next_hop_peer_id,
        ipv4: Some(0x0A90_9000 | (peer_id as i64 & 0xFF)),
        path_latency: 10,
        cost: if peer_id == next_hop_peer_id { 1 } else { 2 },
        nat_type: Some(0),
    }
}

impl RouteFixture {
    /// Drop the virtual IP
    pub fn without_ip(mut self) -> Self {
        self.ipv4 = None;
        self
    }

    /// Set the path latency in milliseconds
    pub fn path_latency(mut self, ms: u32) -> Self {
        self.path_latency = ms;
        self
    }

    /// Set the NAT code, or drop `stun_info` entirely with `None`
    pub fn nat_type(mut self, code: Option<i64>) -> Self {
        self.nat_type = code;
        self
    }

    fn to_json(&self) -> Value {
        let mut route = json!({
            "peer_id": self.peer_id,
            "hostname": self.hostname,
            "next_hop_peer_id": self.next_hop_peer_id,
            "path_latency": self.path_latency,
            "cost": self.cost,
            "version": "2.3.0",
            "inst_id": format!("inst-{}", self.peer_id),
        });
        if let Some(addr) = self.ipv4 {
            route["ipv4_addr"] = json!({ "address": { "addr": addr }, "network_length": 24 });
        }
        if let Some(code) = self.nat_type {
            route["stun_info"] = json!({ "udp_nat_type": code, "public_ip": [] });
        }
        route
    }
}

/// One transport connection in wire form
pub fn conn(peer_id: u64, remote_url: &str, latency_us: u64) -> Value {
    let tunnel_type = remote_url.split("://").next().unwrap_or("tcp");
    json!({
        "peer_id": peer_id,
        "tunnel": {
            "tunnel_type": tunnel_type,
            "remote_addr": { "url": remote_url },
        },
        "stats": {
            "latency_us": latency_us,
            "rx_bytes": 2048,
            "tx_bytes": 1024,
        },
    })
}

/// One raw event record, encoded the way the engine encodes it
pub fn event(time: &str, tag: &str, payload: Value) -> String {
    json!({ "time": time, "event": { tag: payload } }).to_string()
}

/// Builder for a single-instance snapshot document
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    instance: String,
    hostname: String,
    virtual_ipv4: Option<(i64, u8)>,
    public_ips: Vec<String>,
    nat_type: i64,
    listeners: Vec<String>,
    interface_ipv4s: Vec<i64>,
    routes: Vec<RouteFixture>,
    peers: Vec<Vec<Value>>,
    events: Vec<String>,
}

impl SnapshotBuilder {
    /// Start a snapshot for `instance` with a local node named `self-node`
    pub fn new(instance: &str) -> Self {
        Self {
            instance: instance.to_string(),
            hostname: "self-node".to_string(),
            virtual_ipv4: None,
            public_ips: Vec::new(),
            nat_type: 0,
            listeners: Vec::new(),
            interface_ipv4s: Vec::new(),
            routes: Vec::new(),
            peers: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn virtual_ipv4(mut self, packed: i64, prefix_len: u8) -> Self {
        self.virtual_ipv4 = Some((packed, prefix_len));
        self
    }

    pub fn public_ip(mut self, ip: &str) -> Self {
        self.public_ips.push(ip.to_string());
        self
    }

    pub fn nat_type(mut self, code: i64) -> Self {
        self.nat_type = code;
        self
    }

    pub fn listener(mut self, url: &str) -> Self {
        self.listeners.push(url.to_string());
        self
    }

    pub fn interface_ipv4(mut self, packed: i64) -> Self {
        self.interface_ipv4s.push(packed);
        self
    }

    pub fn route(mut self, route: RouteFixture) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a peer entry with the given connections
    pub fn peer(mut self, conns: Vec<Value>) -> Self {
        self.peers.push(conns);
        self
    }

    /// Set the event buffer, newest first as the engine reports it
    pub fn raw_events_newest_first<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Set the event buffer from records listed oldest first
    pub fn raw_events_oldest_first<I, S>(self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<String> = events.into_iter().map(Into::into).collect();
        events.reverse();
        self.raw_events_newest_first(events)
    }

    /// Render the snapshot document
    pub fn build(&self) -> String {
        let mut node = json!({
            "hostname": self.hostname,
            "version": "2.3.0",
            "ips": {
                "interface_ipv4s": self
                    .interface_ipv4s
                    .iter()
                    .map(|addr| json!({ "addr": addr }))
                    .collect::<Vec<_>>(),
            },
            "stun_info": {
                "udp_nat_type": self.nat_type,
                "public_ip": self.public_ips,
            },
            "listeners": self
                .listeners
                .iter()
                .map(|url| json!({ "url": url }))
                .collect::<Vec<_>>(),
        });
        if let Some((addr, len)) = self.virtual_ipv4 {
            node["virtual_ipv4"] = json!({ "address": { "addr": addr }, "network_length": len });
        }

        let routes: Vec<Value> = self.routes.iter().map(RouteFixture::to_json).collect();
        let peers: Vec<Value> = self
            .peers
            .iter()
            .map(|conns| json!({ "conns": conns }))
            .collect();

        let mut map = serde_json::Map::new();
        map.insert(
            self.instance.clone(),
            json!({
                "my_node_info": node,
                "routes": routes,
                "peers": peers,
                "events": self.events,
            }),
        );
        json!({ "map": map }).to_string()
    }
}
