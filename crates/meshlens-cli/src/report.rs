//! Plain-text rendering of node info and peer tables

use meshlens_core::{NodeSelfInfo, ResolvedPeerView};
use meshlens_events::translate_batch;
use meshlens_topology::DecodedSnapshot;

const PEER_HEADERS: [&str; 7] = [
    "HOSTNAME", "VIRTUAL IP", "ROUTE", "LATENCY", "TRAFFIC", "NAT", "VERSION",
];

pub fn node_summary(node: &NodeSelfInfo) -> String {
    let listeners = if node.listeners.is_empty() {
        "-".to_string()
    } else {
        node.listeners.join(", ")
    };
    [
        format!("Hostname:    {}", node.hostname),
        format!("Version:     {}", node.version),
        format!("Virtual IP:  {}", node.virtual_addr_label()),
        format!("Public IP:   {}", node.public_addrs_label()),
        format!("NAT type:    {}", node.nat_type),
        format!("Listeners:   {}", listeners),
    ]
    .join("\n")
}

/// Left-aligned columns sized to their widest cell
pub fn peer_table(peers: &[ResolvedPeerView]) -> String {
    if peers.is_empty() {
        return "No peers".to_string();
    }

    let rows: Vec<[String; 7]> = peers
        .iter()
        .map(|peer| {
            [
                peer.hostname.clone(),
                peer.virtual_ip.clone(),
                peer.connection_details.clone(),
                peer.latency.clone(),
                peer.traffic.clone(),
                peer.nat_type.to_string(),
                peer.version.clone(),
            ]
        })
        .collect();

    let mut widths = PEER_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = PEER_HEADERS.map(str::to_string);
    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Node summary, peer table and the snapshot's events, blank-line separated
pub fn inspect_report(snapshot: &DecodedSnapshot) -> String {
    let mut sections = vec![
        node_summary(&snapshot.node),
        peer_table(&snapshot.resolve_peers()),
    ];
    let events: Vec<String> = translate_batch(&snapshot.raw_events)
        .iter()
        .map(|record| record.display_text())
        .collect();
    if !events.is_empty() {
        sections.push(events.join("\n"));
    }
    sections.join("\n\n")
}
