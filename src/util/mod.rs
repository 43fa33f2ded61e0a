use std::net::IpAddr;

use local_ip_address::list_afinet_netifas;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_log() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Pick an IPv4 address a browser on the local network can reach us on.
///
/// Skips loopback, link-local and broadcast addresses and returns the first
/// routable interface address, or `None` if the host has none.
pub fn select_host_address() -> Option<IpAddr> {
    let interfaces = match list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            debug!("Could not list network interfaces: {}", e);
            return None;
        }
    };

    interfaces.into_iter().find_map(|(name, ip)| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() && !v4.is_broadcast() => {
            debug!("iface: {} / {:?}", name, ip);
            Some(ip)
        }
        _ => None,
    })
}
