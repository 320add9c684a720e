//! Display formatting for snapshot values

use std::net::Ipv4Addr;

const UNIT_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Format a byte count with 1024-based units
///
/// Values under 1024 print as whole bytes (`"1023 B"`); larger values get
/// one decimal place (`"1.5 KB"`, `"1.0 MB"`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut exp = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && exp < UNIT_PREFIXES.len() {
        scaled /= 1024;
        exp += 1;
    }

    let value = bytes as f64 / 1024f64.powi(exp as i32);
    format!("{:.1} {}B", value, UNIT_PREFIXES[exp - 1])
}

/// Format a received/sent pair as `"rx / tx"`
pub fn format_traffic(rx_bytes: u64, tx_bytes: u64) -> String {
    format!("{} / {}", format_bytes(rx_bytes), format_bytes(tx_bytes))
}

/// Format a connection latency given in microseconds as whole milliseconds
pub fn format_latency_us(latency_us: u64) -> String {
    format!("{} ms", latency_us / 1000)
}

/// Format a routed path latency given in milliseconds
pub fn format_path_latency(latency_ms: u32) -> String {
    format!("{} ms (path)", latency_ms)
}

/// Unpack a 32-bit packed address into an IPv4 address
///
/// The engine emits these as signed JSON integers, so negative values are
/// reinterpreted bit-for-bit.
pub fn packed_ipv4(addr: i64) -> Ipv4Addr {
    Ipv4Addr::from(addr as u32)
}

/// Last four decimal digits of a peer id, used in log messages
pub fn short_peer_id(peer_id: u64) -> String {
    let digits = peer_id.to_string();
    digits[digits.len().saturating_sub(4)..].to_string()
}
