//! Utility functions for the lobby broker

use chrono::{DateTime, Utc};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Best-effort discovery of the local IPv4 address clients should dial.
///
/// Opens a UDP socket towards a public address to learn which local
/// interface the OS would route through; no packet is actually sent.
/// Falls back to loopback when the host has no route.
pub fn local_ipv4() -> IpAddr {
    discover_local_ipv4().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn discover_local_ipv4() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    Some(socket.local_addr().ok()?.ip())
}
