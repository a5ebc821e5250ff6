//! Local address discovery.

use std::net::{IpAddr, Ipv4Addr};

/// Always served, regardless of discovered interfaces.
pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// An address assigned to a local interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub ip: IpAddr,
    pub loopback: bool,
}

/// Build the set of addresses to listen on.
///
/// Loopback comes first; unless `local_only`, every non-loopback IPv4
/// interface address follows in discovery order, without duplicates.
pub fn collect_addresses(
    local_only: bool,
    interfaces: impl IntoIterator<Item = InterfaceAddr>,
) -> Vec<IpAddr> {
    let mut addresses = vec![LOOPBACK];
    if local_only {
        return addresses;
    }

    for iface in interfaces {
        if iface.loopback || !iface.ip.is_ipv4() || addresses.contains(&iface.ip) {
            continue;
        }
        addresses.push(iface.ip);
    }
    addresses
}

/// Enumerate local interfaces once and build the listen set.
///
/// Enumeration failure degrades to loopback only.
pub fn discover_addresses(local_only: bool) -> Vec<IpAddr> {
    if local_only {
        return collect_addresses(true, []);
    }

    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to enumerate network interfaces; serving on loopback only");
            Vec::new()
        }
    };

    collect_addresses(
        false,
        interfaces.iter().map(|iface| InterfaceAddr {
            ip: iface.ip(),
            loopback: iface.is_loopback(),
        }),
    )
}
