use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub struct Utils;

impl Utils {
    /// Parse an address:port string as printed by lsof.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1%lo0]:8080"
    ///
    /// A `*` wildcard maps to the unspecified address of the family given by
    /// `ipv6`.
    pub fn parse_address(address: &str, ipv6: bool) -> Option<(IpAddr, u16)> {
        let (host, port_str) = if address.starts_with('[') {
            // IPv6 format: [::1]:3000
            let bracket_end = address.find(']')?;
            if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
                return None;
            }
            (&address[1..bracket_end], &address[bracket_end + 2..])
        } else {
            // IPv4 format: 127.0.0.1:3000 or *:8080
            let last_colon = address.rfind(':')?;
            (&address[..last_colon], &address[last_colon + 1..])
        };

        let port: u16 = port_str.parse().ok()?;

        let ip = if host.is_empty() || host == "*" {
            if ipv6 {
                IpAddr::V6(Ipv6Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            }
        } else {
            // Drop the zone index of link-local addresses.
            let host = host.split('%').next().unwrap_or(host);
            host.parse().ok()?
        };

        Some((ip, port))
    }

    /// Parse an address.port string as printed by `netstat -an` on macOS.
    ///
    /// The port follows the last dot: "127.0.0.1.3000", "::1.3000",
    /// "fe80::1%lo0.123" or "*.8080".
    pub fn parse_netstat_address(address: &str, ipv6: bool) -> Option<(IpAddr, u16)> {
        let (host, port_str) = address.rsplit_once('.')?;
        let port: u16 = port_str.parse().ok()?;

        let ip = if host == "*" {
            if ipv6 {
                IpAddr::V6(Ipv6Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            }
        } else {
            let host = host.split('%').next().unwrap_or(host);
            host.parse().ok()?
        };

        Some((ip, port))
    }
}
