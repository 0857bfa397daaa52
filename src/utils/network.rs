use local_ip_address::local_ip;
use std::net::IpAddr;

/// First non-loopback IPv4 address of this host, if any.
///
/// Only used for the startup banner, so a lookup failure just falls back
/// to the bind host.
pub fn lan_ipv4() -> Option<IpAddr> {
    match local_ip() {
        Ok(ip) if ip.is_ipv4() && !ip.is_loopback() => Some(ip),
        Ok(ip) => {
            log::debug!("Ignoring local address {}", ip);
            None
        }
        Err(e) => {
            log::debug!("Could not resolve local IP: {}", e);
            None
        }
    }
}

/// Address operators can paste into a browser: LAN IPv4 when bound to all
/// interfaces, the configured host otherwise.
pub fn display_host(bind_host: &str) -> String {
    if bind_host == "0.0.0.0" {
        if let Some(ip) = lan_ipv4() {
            return ip.to_string();
        }
    }
    bind_host.to_string()
}
