//! Discovery providers: the URL a phone should open to reach this host.
//!
//! The URL is only ever displayed (logged at startup).  It plays no part in
//! command processing, so any provider can be swapped in.
//!
//! # How the LAN address is found
//!
//! [`LanDiscovery`] "connects" an unbound UDP socket to a public address.  No
//! packet is sent; the OS just picks the outgoing interface, whose address is
//! then read back with `local_addr()`.  When that fails (no route, offline
//! machine) the loopback address is used.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use tracing::debug;

use crate::domain::HostConfig;

/// Address used only to select the outgoing interface; never contacted.
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// Something that can tell the user where to point their phone.
pub trait DiscoveryProvider: Send + Sync {
    fn current_connection_url(&self) -> String;
}

/// Always returns a fixed, configured URL.
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    url: String,
}

impl StaticDiscovery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl DiscoveryProvider for StaticDiscovery {
    fn current_connection_url(&self) -> String {
        self.url.clone()
    }
}

/// Builds `ws://<lan-ip>:<port>` from the host's LAN address.
#[derive(Debug, Clone)]
pub struct LanDiscovery {
    bind_addr: SocketAddr,
}

impl LanDiscovery {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }

    /// The address a phone on the LAN can reach.
    ///
    /// A specific bind address is used as-is; a wildcard bind falls back to
    /// the outgoing interface.
    pub fn advertised_ip(&self) -> IpAddr {
        let ip = self.bind_addr.ip();
        if ip.is_unspecified() {
            local_ipv4().map(IpAddr::V4).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
        } else {
            ip
        }
    }
}

impl DiscoveryProvider for LanDiscovery {
    fn current_connection_url(&self) -> String {
        let addr = SocketAddr::new(self.advertised_ip(), self.bind_addr.port());
        format!("ws://{addr}")
    }
}

/// Picks the provider for `config`: the public URL when set, LAN otherwise.
pub fn discovery_for(config: &HostConfig) -> Box<dyn DiscoveryProvider> {
    match &config.public_url {
        Some(url) => Box::new(StaticDiscovery::new(url.clone())),
        None => Box::new(LanDiscovery::new(config.bind_addr)),
    }
}

/// First non-loopback IPv4 address of the outgoing interface.
fn local_ipv4() -> Option<Ipv4Addr> {
    let probe = || -> std::io::Result<SocketAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(ROUTE_PROBE_ADDR)?;
        socket.local_addr()
    };

    match probe() {
        Ok(SocketAddr::V4(addr)) if !addr.ip().is_loopback() && !addr.ip().is_unspecified() => {
            Some(*addr.ip())
        }
        Ok(other) => {
            debug!("ignoring non-LAN local address {other}");
            None
        }
        Err(e) => {
            debug!("could not determine LAN address: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_discovery_returns_configured_url() {
        let d = StaticDiscovery::new("https://pad.example/");
        assert_eq!(d.current_connection_url(), "https://pad.example/");
    }

    #[test]
    fn test_lan_discovery_uses_specific_bind_address() {
        let d = LanDiscovery::new("10.1.2.3:3000".parse().unwrap());
        assert_eq!(d.current_connection_url(), "ws://10.1.2.3:3000");
    }

    #[test]
    fn test_lan_discovery_wildcard_never_advertises_unspecified() {
        let d = LanDiscovery::new("0.0.0.0:3000".parse().unwrap());
        let ip = d.advertised_ip();
        assert!(!ip.is_unspecified());
        assert!(d.current_connection_url().ends_with(":3000"));
    }

    #[test]
    fn test_discovery_for_prefers_public_url() {
        let cfg = HostConfig {
            public_url: Some("https://pad.example/".into()),
            ..HostConfig::default()
        };
        assert_eq!(
            discovery_for(&cfg).current_connection_url(),
            "https://pad.example/"
        );
    }

    #[test]
    fn test_discovery_for_defaults_to_lan() {
        let cfg = HostConfig {
            bind_addr: "127.0.0.1:3100".parse().unwrap(),
            ..HostConfig::default()
        };
        assert_eq!(discovery_for(&cfg).current_connection_url(), "ws://127.0.0.1:3100");
    }
}
