//! Engine event variants
//!
//! The engine encodes each event as a single-key object, `{"<Tag>": payload}`.
//! [`EngineEvent::from_tagged`] turns that pair into a typed variant; tags
//! this crate does not know land in [`EngineEvent::Other`] so new engine
//! versions never break translation.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use meshlens_core::{EventError, EventLevel, EventResult, PeerId, short_peer_id};

/// A decoded engine event
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A transport connection to a peer came up
    PeerConnAdded {
        peer_id: PeerId,
        tunnel_type: String,
        remote_url: String,
    },

    /// A transport connection to a peer went away
    PeerConnRemoved { peer_id: PeerId },

    /// A new peer was discovered
    PeerAdded(PeerId),

    /// A peer left the mesh
    PeerRemoved(PeerId),

    /// An inbound connection was accepted
    ConnectionAccepted { remote: String },

    /// A connection attempt failed
    ConnectionError { error: String },

    /// A listener was bound
    ListenerAdded(String),

    /// An outbound connection attempt started
    Connecting(String),

    /// The virtual network device is up
    TunDeviceReady,

    /// The DHCP-assigned address changed
    DhcpIpv4Changed {
        old: Option<String>,
        new: Option<String>,
    },

    /// Any tag not listed above
    Other { tag: String, payload: Value },
}

#[derive(Deserialize)]
struct WireConnPeer {
    peer_id: PeerId,
}

#[derive(Deserialize)]
struct WireConnAdded {
    peer_id: PeerId,
    tunnel: WireTunnel,
}

#[derive(Deserialize)]
struct WireTunnel {
    tunnel_type: String,
    remote_addr: WireUrl,
}

#[derive(Deserialize)]
struct WireUrl {
    url: String,
}

impl EngineEvent {
    /// Decode a variant from its tag and payload
    pub fn from_tagged(tag: &str, payload: Value) -> EventResult<Self> {
        let event = match tag {
            "PeerConnAdded" => {
                let conn: WireConnAdded = payload_as(tag, payload)?;
                Self::PeerConnAdded {
                    peer_id: conn.peer_id,
                    tunnel_type: conn.tunnel.tunnel_type,
                    remote_url: conn.tunnel.remote_addr.url,
                }
            }
            "PeerConnRemoved" => {
                let conn: WireConnPeer = payload_as(tag, payload)?;
                Self::PeerConnRemoved {
                    peer_id: conn.peer_id,
                }
            }
            "PeerAdded" => Self::PeerAdded(payload_as(tag, payload)?),
            "PeerRemoved" => Self::PeerRemoved(payload_as(tag, payload)?),
            "ConnectionAccepted" => Self::ConnectionAccepted {
                remote: string_at(tag, &payload, 1)?,
            },
            "ConnectionError" => Self::ConnectionError {
                error: string_at(tag, &payload, 2)?,
            },
            "ListenerAdded" => Self::ListenerAdded(payload_as(tag, payload)?),
            "Connecting" => Self::Connecting(payload_as(tag, payload)?),
            "TunDeviceReady" => Self::TunDeviceReady,
            "DhcpIpv4Changed" => {
                let items = payload
                    .as_array()
                    .ok_or_else(|| EventError::payload(tag, "expected an array"))?;
                Self::DhcpIpv4Changed {
                    old: items.first().and_then(loose_string),
                    new: items.get(1).and_then(loose_string),
                }
            }
            _ => Self::Other {
                tag: tag.to_string(),
                payload,
            },
        };
        Ok(event)
    }

    /// Severity shown in the log view
    pub fn level(&self) -> EventLevel {
        match self {
            Self::PeerConnAdded { .. } | Self::ConnectionAccepted { .. } | Self::TunDeviceReady => {
                EventLevel::Success
            }
            Self::PeerConnRemoved { .. } | Self::PeerRemoved(_) => EventLevel::Warning,
            Self::ConnectionError { .. } => EventLevel::Error,
            Self::PeerAdded(_)
            | Self::ListenerAdded(_)
            | Self::Connecting(_)
            | Self::DhcpIpv4Changed { .. }
            | Self::Other { .. } => EventLevel::Info,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Self::PeerConnAdded {
                peer_id,
                tunnel_type,
                remote_url,
            } => format!(
                "[{}] peer ({}) connected: {}",
                tunnel_type.to_uppercase(),
                short_peer_id(*peer_id),
                remote_url
            ),
            Self::PeerConnRemoved { peer_id } => {
                format!("peer ({}) disconnected", short_peer_id(*peer_id))
            }
            Self::PeerAdded(peer_id) => format!("discovered peer ({})", short_peer_id(*peer_id)),
            Self::PeerRemoved(peer_id) => format!("peer ({}) removed", short_peer_id(*peer_id)),
            Self::ConnectionAccepted { remote } => format!("accepted connection from {}", remote),
            Self::ConnectionError { error } => format!("connection error: {}", error),
            Self::ListenerAdded(url) => format!("listening on {}", url),
            Self::Connecting(url) => format!("connecting to {}", url),
            Self::TunDeviceReady => "virtual device ready".to_string(),
            Self::DhcpIpv4Changed { old, new } => format!(
                "DHCP address changed: {} -> {}",
                old.as_deref().unwrap_or("none"),
                new.as_deref().unwrap_or("N/A")
            ),
            Self::Other { tag, payload } => match payload {
                Value::String(text) => format!("{}: {}", tag, text),
                other => format!("{}: {}", tag, other),
            },
        }
    }
}

fn payload_as<T: DeserializeOwned>(tag: &str, payload: Value) -> EventResult<T> {
    serde_json::from_value(payload).map_err(|e| EventError::payload(tag, e.to_string()))
}

fn string_at(tag: &str, payload: &Value, index: usize) -> EventResult<String> {
    payload
        .get(index)
        .and_then(loose_string)
        .ok_or_else(|| EventError::payload(tag, format!("missing element {}", index)))
}

// Strings pass through unquoted, null means absent, anything else is shown as JSON.
fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
