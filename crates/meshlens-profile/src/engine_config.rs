//! Engine configuration document
//!
//! [`EngineConfig`] mirrors the TOML file the engine is started with.
//! Profiles convert to it for rendering and back from it when a TOML file
//! is imported. Settings that are switched off or blank are left out of
//! the document entirely.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProfileResult;
use crate::profile::{NetworkProfile, PortForwardItem, lines};

/// `[network_identity]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub network_name: String,
    pub network_secret: String,
}

/// `[[peer]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub uri: String,
}

/// `[[proxy_network]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyNetworkConfig {
    pub cidr: String,
}

/// `[vpn_portal_config]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnPortalConfig {
    pub client_cidr: String,
    pub wireguard_listen: String,
}

/// `[[port_forward]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForwardConfig {
    pub bind_addr: String,
    pub dst_addr: String,
    pub proto: String,
}

/// `[flags]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_network_whitelist: Option<String>,
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

impl Default for Flags {
    fn default() -> Self {
        Self {
            dev_name: None,
            mtu: None,
            relay_network_whitelist: None,
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

/// The engine's TOML configuration
///
/// Plain values come first and tables last, matching the order they are
/// written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub dhcp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapped_listeners: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_portal: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_portal_whitelist: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socks5_proxy: Option<String>,

    #[serde(default)]
    pub network_identity: NetworkIdentity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peer: Vec<PeerConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxy_network: Vec<ProxyNetworkConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpn_portal_config: Option<VpnPortalConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_forward: Vec<PortForwardConfig>,
    #[serde(default)]
    pub flags: Flags,
}

impl EngineConfig {
    /// Parse an engine TOML document
    pub fn from_toml(text: &str) -> ProfileResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Render as an engine TOML document
    pub fn render_toml(&self) -> ProfileResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Convert back into a flat profile
    ///
    /// Composite values that cannot be split fall back to profile defaults;
    /// incomplete port forwards are dropped.
    pub fn to_profile(&self) -> NetworkProfile {
        let defaults = NetworkProfile::default();

        let (virtual_ipv4, network_length) = match &self.ipv4 {
            Some(cidr) => split_cidr(cidr, "", 24),
            None => (String::new(), 24),
        };
        let (vpn_addr, vpn_len) = match &self.vpn_portal_config {
            Some(portal) => split_cidr(&portal.client_cidr, "10.14.14.0", 24),
            None => ("10.14.14.0".to_string(), 24),
        };
        let vpn_port = self
            .vpn_portal_config
            .as_ref()
            .and_then(|portal| last_port(&portal.wireguard_listen))
            .unwrap_or(defaults.vpn_portal_listen_port);
        let socks5_port = self
            .socks5_proxy
            .as_deref()
            .and_then(last_port)
            .unwrap_or(defaults.socks5_port);

        let flags = &self.flags;
        NetworkProfile {
            id: if self.instance_id.trim().is_empty() {
                Uuid::new_v4().to_string()
            } else {
                self.instance_id.clone()
            },
            instance_name: self.instance_name.clone(),
            virtual_ipv4,
            network_length,
            dhcp: self.dhcp,
            network_name: self.network_identity.network_name.clone(),
            network_secret: self.network_identity.network_secret.clone(),
            peers: join(self.peer.iter().map(|p| p.uri.as_str())),
            hostname: self.hostname.clone().unwrap_or_default(),
            proxy_networks: join(self.proxy_network.iter().map(|p| p.cidr.as_str())),
            enable_vpn_portal: self.vpn_portal_config.is_some(),
            vpn_portal_client_network_addr: vpn_addr,
            vpn_portal_client_network_len: vpn_len,
            vpn_portal_listen_port: vpn_port,
            listener_urls: join(self.listeners.iter().map(String::as_str)),
            dev_name: flags.dev_name.clone().unwrap_or_default(),
            mtu: flags.mtu.map(|mtu| mtu.to_string()).unwrap_or_default(),
            enable_relay_network_whitelist: flags
                .relay_network_whitelist
                .as_deref()
                .is_some_and(|w| !w.trim().is_empty()),
            relay_network_whitelist: flags.relay_network_whitelist.clone().unwrap_or_default(),
            enable_manual_routes: !self.routes.is_empty(),
            routes: join(self.routes.iter().map(String::as_str)),
            enable_socks5: self.socks5_proxy.is_some(),
            socks5_port,
            exit_nodes: join(self.exit_nodes.iter().map(String::as_str)),
            mapped_listeners: join(self.mapped_listeners.iter().map(String::as_str)),
            rpc_portal: self.rpc_portal.clone().unwrap_or(defaults.rpc_portal),
            rpc_portal_whitelist: join(self.rpc_portal_whitelist.iter().map(String::as_str)),
            port_forwards: self.port_forward.iter().filter_map(port_forward_item).collect(),
            latency_first: flags.latency_first,
            use_smoltcp: flags.use_smoltcp,
            disable_ipv6: flags.disable_ipv6,
            enable_kcp_proxy: flags.enable_kcp_proxy,
            disable_kcp_input: flags.disable_kcp_input,
            enable_quic_proxy: flags.enable_quic_proxy,
            disable_quic_input: flags.disable_quic_input,
            disable_p2p: flags.disable_p2p,
            bind_device: flags.bind_device,
            no_tun: flags.no_tun,
            enable_exit_node: flags.enable_exit_node,
            relay_all_peer_rpc: flags.relay_all_peer_rpc,
            multi_thread: flags.multi_thread,
            proxy_forward_by_system: flags.proxy_forward_by_system,
            disable_encryption: flags.disable_encryption,
            disable_udp_hole_punching: flags.disable_udp_hole_punching,
            disable_sym_hole_punching: flags.disable_sym_hole_punching,
            accept_dns: flags.accept_dns,
            private_mode: flags.private_mode,
        }
    }
}

impl NetworkProfile {
    /// Build the engine configuration for this profile
    pub fn to_engine_config(&self) -> EngineConfig {
        let flags = Flags {
            dev_name: non_blank(&self.dev_name),
            mtu: self.mtu.trim().parse().ok(),
            relay_network_whitelist: if self.enable_relay_network_whitelist {
                non_blank(&self.relay_network_whitelist)
            } else {
                None
            },
            latency_first: self.latency_first,
            use_smoltcp: self.use_smoltcp,
            disable_ipv6: self.disable_ipv6,
            enable_kcp_proxy: self.enable_kcp_proxy,
            disable_kcp_input: self.disable_kcp_input,
            enable_quic_proxy: self.enable_quic_proxy,
            disable_quic_input: self.disable_quic_input,
            disable_p2p: self.disable_p2p,
            bind_device: self.bind_device,
            no_tun: self.no_tun,
            enable_exit_node: self.enable_exit_node,
            relay_all_peer_rpc: self.relay_all_peer_rpc,
            multi_thread: self.multi_thread,
            proxy_forward_by_system: self.proxy_forward_by_system,
            disable_encryption: self.disable_encryption,
            disable_udp_hole_punching: self.disable_udp_hole_punching,
            disable_sym_hole_punching: self.disable_sym_hole_punching,
            accept_dns: self.accept_dns,
            private_mode: self.private_mode,
        };

        EngineConfig {
            hostname: non_blank(&self.hostname),
            instance_name: self.instance_name.clone(),
            instance_id: self.id.clone(),
            dhcp: self.dhcp,
            ipv4: if !self.dhcp && !self.virtual_ipv4.trim().is_empty() {
                Some(format!("{}/{}", self.virtual_ipv4.trim(), self.network_length))
            } else {
                None
            },
            listeners: lines(&self.listener_urls),
            mapped_listeners: lines(&self.mapped_listeners),
            exit_nodes: lines(&self.exit_nodes),
            rpc_portal: non_blank(&self.rpc_portal),
            rpc_portal_whitelist: lines(&self.rpc_portal_whitelist),
            routes: if self.enable_manual_routes {
                lines(&self.routes)
            } else {
                Vec::new()
            },
            socks5_proxy: self
                .enable_socks5
                .then(|| format!("socks5://0.0.0.0:{}", self.socks5_port)),
            network_identity: NetworkIdentity {
                network_name: self.network_name.clone(),
                network_secret: self.network_secret.clone(),
            },
            peer: lines(&self.peers)
                .into_iter()
                .map(|uri| PeerConfig { uri })
                .collect(),
            proxy_network: lines(&self.proxy_networks)
                .into_iter()
                .map(|cidr| ProxyNetworkConfig { cidr })
                .collect(),
            vpn_portal_config: self.enable_vpn_portal.then(|| VpnPortalConfig {
                client_cidr: format!(
                    "{}/{}",
                    self.vpn_portal_client_network_addr, self.vpn_portal_client_network_len
                ),
                wireguard_listen: format!("0.0.0.0:{}", self.vpn_portal_listen_port),
            }),
            port_forward: self
                .port_forwards
                .iter()
                .filter(|pf| pf.is_complete())
                .filter_map(|pf| {
                    Some(PortForwardConfig {
                        bind_addr: format!("{}:{}", pf.bind_ip, pf.bind_port?),
                        dst_addr: format!("{}:{}", pf.dst_ip, pf.dst_port?),
                        proto: pf.proto.clone(),
                    })
                })
                .collect(),
            flags,
        }
    }

    /// Render this profile's engine configuration as TOML
    pub fn render_toml(&self) -> ProfileResult<String> {
        self.to_engine_config().render_toml()
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

fn split_cidr(cidr: &str, default_addr: &str, default_len: u8) -> (String, u8) {
    let mut parts = cidr.splitn(2, '/');
    let addr = parts
        .next()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(default_addr)
        .to_string();
    let len = parts
        .next()
        .and_then(|l| l.trim().parse().ok())
        .unwrap_or(default_len);
    (addr, len)
}

fn last_port(addr: &str) -> Option<u16> {
    addr.rsplit(':').next().and_then(|p| p.trim().parse().ok())
}

fn split_host_port(addr: &str) -> (String, Option<u16>) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.trim().to_string(), port.trim().parse().ok()),
        None => (addr.trim().to_string(), None),
    }
}

fn port_forward_item(pf: &PortForwardConfig) -> Option<PortForwardItem> {
    let (bind_ip, bind_port) = split_host_port(&pf.bind_addr);
    let (dst_ip, dst_port) = split_host_port(&pf.dst_addr);
    let item = PortForwardItem {
        proto: pf.proto.clone(),
        bind_ip: if bind_ip.is_empty() {
            "0.0.0.0".to_string()
        } else {
            bind_ip
        },
        bind_port,
        dst_ip,
        dst_port,
        ..Default::default()
    };
    item.is_complete().then_some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_profile() -> NetworkProfile {
        NetworkProfile {
            id: "53dccdcf-9f9b-4062-a62c-8ec97f3bac0e".to_string(),
            instance_name: "home".to_string(),
            hostname: "laptop".to_string(),
            dhcp: false,
            virtual_ipv4: "10.144.144.5".to_string(),
            network_length: 24,
            network_name: "family".to_string(),
            network_secret: "s3cret".to_string(),
            peers: "tcp://198.51.100.1:11010\n\nudp://198.51.100.2:11010".to_string(),
            proxy_networks: "192.168.1.0/24".to_string(),
            enable_socks5: true,
            socks5_port: 1081,
            mtu: "1380".to_string(),
            port_forwards: vec![
                PortForwardItem {
                    bind_port: Some(8080),
                    dst_ip: "10.144.144.9".to_string(),
                    dst_port: Some(80),
                    ..Default::default()
                },
                PortForwardItem::default(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_config_from_profile() {
        let config = static_profile().to_engine_config();

        assert_eq!(config.hostname.as_deref(), Some("laptop"));
        assert_eq!(config.ipv4.as_deref(), Some("10.144.144.5/24"));
        assert_eq!(config.peer.len(), 2);
        assert_eq!(config.proxy_network[0].cidr, "192.168.1.0/24");
        assert_eq!(config.socks5_proxy.as_deref(), Some("socks5://0.0.0.0:1081"));
        assert_eq!(config.flags.mtu, Some(1380));
        assert_eq!(config.port_forward.len(), 1);
        assert_eq!(config.port_forward[0].bind_addr, "0.0.0.0:8080");
        assert!(config.vpn_portal_config.is_none());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_dhcp_omits_ipv4() {
        let profile = NetworkProfile {
            virtual_ipv4: "10.0.0.1".to_string(),
            ..Default::default()
        };
        assert!(profile.to_engine_config().ipv4.is_none());
    }

    #[test]
    fn test_disabled_sections_omitted() {
        let profile = NetworkProfile {
            routes: "10.1.0.0/16".to_string(),
            relay_network_whitelist: "family".to_string(),
            ..Default::default()
        };
        let config = profile.to_engine_config();
        assert!(config.routes.is_empty());
        assert!(config.flags.relay_network_whitelist.is_none());
    }

    #[test]
    fn test_render_toml() {
        let text = static_profile().render_toml().unwrap();

        assert!(text.contains("instance_name = \"home\""));
        assert!(text.contains("ipv4 = \"10.144.144.5/24\""));
        assert!(text.contains("[network_identity]"));
        assert!(text.contains("[[peer]]"));
        assert!(text.contains("[[port_forward]]"));
        assert!(text.contains("[flags]"));
        assert!(!text.contains("vpn_portal_config"));
        assert!(!text.contains("exit_nodes"));
    }

    #[test]
    fn test_toml_back_to_profile() {
        let profile = static_profile();
        let text = profile.render_toml().unwrap();
        let restored = EngineConfig::from_toml(&text).unwrap().to_profile();

        assert_eq!(restored.id, profile.id);
        assert_eq!(restored.virtual_ipv4, "10.144.144.5");
        assert_eq!(restored.peers, "tcp://198.51.100.1:11010\nudp://198.51.100.2:11010");
        assert_eq!(restored.socks5_port, 1081);
        assert!(restored.enable_socks5);
        assert_eq!(restored.mtu, "1380");
        assert_eq!(restored.port_forwards.len(), 1);
        assert_eq!(restored.port_forwards[0].dst_ip, "10.144.144.9");
    }

    #[test]
    fn test_import_minimal_toml() {
        let text = r#"
            instance_name = "imported"
            dhcp = true

            [network_identity]
            network_name = "n"
            network_secret = "s"

            [vpn_portal_config]
            client_cidr = "10.20.0.0/16"
            wireguard_listen = "0.0.0.0:51820"

            [[port_forward]]
            bind_addr = "0.0.0.0:1"
            dst_addr = "nohost"
            proto = "udp"
        "#;
        let profile = EngineConfig::from_toml(text).unwrap().to_profile();

        assert_eq!(profile.instance_name, "imported");
        assert!(uuid::Uuid::parse_str(&profile.id).is_ok());
        assert!(profile.enable_vpn_portal);
        assert_eq!(profile.vpn_portal_client_network_addr, "10.20.0.0");
        assert_eq!(profile.vpn_portal_client_network_len, 16);
        assert_eq!(profile.vpn_portal_listen_port, 51820);
        assert!(profile.multi_thread);
        assert_eq!(profile.rpc_portal, "0.0.0.0:0");
        assert!(profile.port_forwards.is_empty());
    }
}
