//! Public address classification
//!
//! Only globally-routable unicast addresses may be published. Everything
//! else (private, loopback, link-local, shared, multicast, reserved) fails
//! with the same [`Error::InvalidAddress`] as unparseable input.
//!
//! Documentation ranges (`192.0.2.0/24`, `198.51.100.0/24`,
//! `203.0.113.0/24`, `2001:db8::/32`) are accepted.

use crate::error::{Error, Result};
use crate::traits::RecordType;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address family of a classified address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IpVersion {
    V4,
    V6,
}

/// A validated, publicly routable IP address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(IpAddr);

impl Address {
    pub fn version(&self) -> IpVersion {
        match self.0 {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Record type that publishes this address
    pub fn record_type(&self) -> RecordType {
        match self.version() {
            IpVersion::V4 => RecordType::A,
            IpVersion::V6 => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// The addresses a run publishes, at most one per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetAddresses {
    pub ipv4: Option<Address>,
    pub ipv6: Option<Address>,
}

impl TargetAddresses {
    /// Record an address; a later address replaces an earlier one of the same family
    pub fn insert(&mut self, address: Address) -> Option<Address> {
        match address.version() {
            IpVersion::V4 => self.ipv4.replace(address),
            IpVersion::V6 => self.ipv6.replace(address),
        }
    }

    /// Target for a record type, if one was supplied
    pub fn for_type(&self, record_type: RecordType) -> Option<&Address> {
        match record_type {
            RecordType::A => self.ipv4.as_ref(),
            RecordType::Aaaa => self.ipv6.as_ref(),
        }
    }

    /// Record types that have a target this run, A before AAAA
    pub fn record_types(&self) -> Vec<RecordType> {
        [RecordType::A, RecordType::Aaaa]
            .into_iter()
            .filter(|t| self.for_type(*t).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }
}

/// Validate and classify an address literal
pub fn classify(candidate: &str) -> Result<Address> {
    let trimmed = candidate.trim();
    let ip: IpAddr = trimmed
        .parse()
        .map_err(|_| Error::invalid_address(format!("'{}' is not an IP address", trimmed)))?;

    let public = match ip {
        IpAddr::V4(v4) => is_public_v4(&v4),
        IpAddr::V6(v6) => is_public_v6(&v6),
    };

    if !public {
        return Err(Error::invalid_address(format!(
            "{} is not a globally routable address",
            ip
        )));
    }

    Ok(Address(ip))
}

fn is_public_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();

    let reserved = ip.is_unspecified()
        || a == 0                                   // "this network"
        || ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || (a == 100 && (b & 0xc0) == 64)           // shared address space, 100.64.0.0/10
        || (a == 192 && b == 0 && c == 0)           // IETF protocol assignments
        || (a == 198 && (b & 0xfe) == 18)           // benchmarking, 198.18.0.0/15
        || ip.is_multicast()
        || a >= 240; // reserved + broadcast

    !reserved
}

fn is_public_v6(ip: &Ipv6Addr) -> bool {
    let segments = ip.segments();

    let reserved = ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        || (segments[0] & 0xfe00) == 0xfc00        // unique local, fc00::/7
        || (segments[0] & 0xffc0) == 0xfe80        // link-local, fe80::/10
        || (segments[0] & 0xffc0) == 0xfec0        // site-local (deprecated), fec0::/10
        || ip.to_ipv4_mapped().is_some()           // ::ffff:0:0/96
        || segments[..6].iter().all(|s| *s == 0)   // IPv4-compatible, ::/96
        || (segments[0] == 0x0100 && segments[1..4].iter().all(|s| *s == 0)); // discard, 100::/64

    !reserved
}
