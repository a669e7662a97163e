//! Loopback and local-network addresses reported on ready

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::resolve::DevServerSettings;

/// Shown when no local-network interface is found
pub const UNAVAILABLE: &str = "unavailable";

/// The two reachable addresses of a running dev server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addresses {
    pub local: String,
    pub network: String,
}

impl Addresses {
    pub fn for_server(server: &DevServerSettings) -> Self {
        Self::with_network_ip(server, local_network_ip())
    }

    pub fn with_network_ip(server: &DevServerSettings, network_ip: Option<IpAddr>) -> Self {
        let local = format!("http://{}:{}", loopback_host(&server.host), server.port);
        let network = match network_ip {
            Some(ip) => format!("http://{}:{}", ip, server.port),
            None => UNAVAILABLE.to_string(),
        };
        Self { local, network }
    }
}

/// Loopback form of a dev-server host, used for printing and probing
pub fn loopback_host(host: &str) -> &str {
    match host {
        "localhost" | "0.0.0.0" | "::" | "" => "127.0.0.1",
        other => other,
    }
}

/// IPv4 address of the interface that routes to the local network.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn local_network_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(10, 254, 254, 254), 1)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(host: &str, port: u16) -> DevServerSettings {
        DevServerSettings {
            host: host.to_string(),
            port,
            ..DevServerSettings::default()
        }
    }

    #[test]
    fn test_localhost_reported_as_loopback() {
        let addrs = Addresses::with_network_ip(&server("localhost", 8066), None);
        assert_eq!(addrs.local, "http://127.0.0.1:8066");
        assert_eq!(addrs.network, UNAVAILABLE);

        let addrs = Addresses::with_network_ip(&server("0.0.0.0", 3000), None);
        assert_eq!(addrs.local, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_host_kept() {
        let ip: IpAddr = "192.168.1.20".parse().unwrap();
        let addrs = Addresses::with_network_ip(&server("dev.local", 8066), Some(ip));
        assert_eq!(addrs.local, "http://dev.local:8066");
        assert_eq!(addrs.network, "http://192.168.1.20:8066");
    }

    #[test]
    fn test_network_ip_never_loopback() {
        if let Some(ip) = local_network_ip() {
            assert!(!ip.is_loopback());
        }
    }
}
