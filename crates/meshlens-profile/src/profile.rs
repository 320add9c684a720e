//! Network profile records
//!
//! A [`NetworkProfile`] is the flat settings record an operator edits. List
//! settings are kept as newline-separated text, the way they are typed in;
//! [`lines`] splits them when the engine configuration is built.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Instance name given to a fresh profile
pub const DEFAULT_INSTANCE_NAME: &str = "meshlens";

/// One port-forward rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortForwardItem {
    pub id: String,
    pub proto: String,
    pub bind_ip: String,
    pub bind_port: Option<u16>,
    pub dst_ip: String,
    pub dst_port: Option<u16>,
}

impl Default for PortForwardItem {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            proto: "tcp".to_string(),
            bind_ip: "0.0.0.0".to_string(),
            bind_port: None,
            dst_ip: String::new(),
            dst_port: None,
        }
    }
}

impl PortForwardItem {
    /// Check whether the rule has everything the engine needs
    pub fn is_complete(&self) -> bool {
        self.bind_port.is_some() && self.dst_port.is_some() && !self.dst_ip.trim().is_empty()
    }
}

/// Flat, persisted settings for one network
///
/// Unknown or missing fields take their defaults when loaded, so older
/// saved books keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkProfile {
    pub id: String,
    pub instance_name: String,

    // Basic
    pub virtual_ipv4: String,
    pub network_length: u8,
    pub dhcp: bool,
    pub network_name: String,
    pub network_secret: String,
    pub peers: String,

    // Advanced
    pub hostname: String,
    pub proxy_networks: String,
    pub enable_vpn_portal: bool,
    pub vpn_portal_client_network_addr: String,
    pub vpn_portal_client_network_len: u8,
    pub vpn_portal_listen_port: u16,
    pub listener_urls: String,
    pub dev_name: String,
    pub mtu: String,
    pub enable_relay_network_whitelist: bool,
    pub relay_network_whitelist: String,
    pub enable_manual_routes: bool,
    pub routes: String,
    pub enable_socks5: bool,
    pub socks5_port: u16,
    pub exit_nodes: String,
    pub mapped_listeners: String,
    pub rpc_portal: String,
    pub rpc_portal_whitelist: String,

    pub port_forwards: Vec<PortForwardItem>,

    // Flags
    pub latency_first: bool,
    pub use_smoltcp: bool,
    pub disable_ipv6: bool,
    pub enable_kcp_proxy: bool,
    pub disable_kcp_input: bool,
    pub enable_quic_proxy: bool,
    pub disable_quic_input: bool,
    pub disable_p2p: bool,
    pub bind_device: bool,
    pub no_tun: bool,
    pub enable_exit_node: bool,
    pub relay_all_peer_rpc: bool,
    pub multi_thread: bool,
    pub proxy_forward_by_system: bool,
    pub disable_encryption: bool,
    pub disable_udp_hole_punching: bool,
    pub disable_sym_hole_punching: bool,
    pub accept_dns: bool,
    pub private_mode: bool,
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instance_name: DEFAULT_INSTANCE_NAME.to_string(),
            virtual_ipv4: String::new(),
            network_length: 24,
            dhcp: true,
            network_name: DEFAULT_INSTANCE_NAME.to_string(),
            network_secret: String::new(),
            peers: String::new(),
            hostname: String::new(),
            proxy_networks: String::new(),
            enable_vpn_portal: false,
            vpn_portal_client_network_addr: "10.14.14.0".to_string(),
            vpn_portal_client_network_len: 24,
            vpn_portal_listen_port: 11011,
            listener_urls: "tcp://0.0.0.0:11010\nudp://0.0.0.0:11010\nwg://0.0.0.0:11011"
                .to_string(),
            dev_name: String::new(),
            mtu: String::new(),
            enable_relay_network_whitelist: false,
            relay_network_whitelist: String::new(),
            enable_manual_routes: false,
            routes: String::new(),
            enable_socks5: false,
            socks5_port: 1080,
            exit_nodes: String::new(),
            mapped_listeners: String::new(),
            rpc_portal: "0.0.0.0:0".to_string(),
            rpc_portal_whitelist: String::new(),
            port_forwards: Vec::new(),
            latency_first: false,
            use_smoltcp: false,
            disable_ipv6: false,
            enable_kcp_proxy: false,
            disable_kcp_input: false,
            enable_quic_proxy: false,
            disable_quic_input: false,
            disable_p2p: false,
            bind_device: false,
            no_tun: false,
            enable_exit_node: false,
            relay_all_peer_rpc: false,
            multi_thread: true,
            proxy_forward_by_system: false,
            disable_encryption: false,
            disable_udp_hole_punching: false,
            disable_sym_hole_punching: false,
            accept_dns: false,
            private_mode: false,
        }
    }
}

impl NetworkProfile {
    /// Create a default profile with the given instance name
    pub fn named(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            ..Default::default()
        }
    }
}

/// Non-blank lines of a multi-line setting
pub fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
