//! Remote address canonicalization

use ipnetwork::Ipv6Network;
use std::net::IpAddr;

use crate::errors::{DomainError, DomainResult};

/// IPv6 addresses share a rate-limit budget per /56
pub const IPV6_PREFIX_LEN: u8 = 56;

/// IPv4 unchanged; IPv6 with every byte after the seventh zeroed.
///
/// Dual-stack listeners report IPv4 peers as `::ffff:a.b.c.d`; those are
/// keyed by the plain IPv4 address.
///
/// The address comes from the transport layer, so a parse failure is an
/// internal error rather than bad caller input.
pub fn canonical_ip(remote_addr: &str) -> DomainResult<String> {
    let trimmed = remote_addr.trim().trim_start_matches('[').trim_end_matches(']');
    let addr: IpAddr = trimmed
        .parse()
        .map_err(|_| DomainError::internal(format!("unparseable remote address '{}'", remote_addr)))?;

    match addr {
        IpAddr::V4(ipv4) => Ok(ipv4.to_string()),
        IpAddr::V6(ipv6) => {
            if let Some(ipv4) = ipv6.to_ipv4_mapped() {
                return Ok(ipv4.to_string());
            }
            let network = Ipv6Network::new(ipv6, IPV6_PREFIX_LEN)
                .map_err(|e| DomainError::internal(format!("invalid IPv6 prefix: {}", e)))?;
            Ok(network.network().to_string())
        }
    }
}
