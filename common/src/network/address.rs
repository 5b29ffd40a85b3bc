//! # Address Model
//!
//! Semantic wrapper over the two fixed-width IP address families (4 bytes
//! for V4, 16 for V6, both network byte order), plus the locality
//! classification used across the workspace.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

/// The address family of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Bit width of an address of this family.
    pub fn width(&self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }
}

/// An IP address of either family, immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid IP address: {0}")]
pub struct ParseAddressError(pub String);

impl Address {
    pub fn family(&self) -> AddressFamily {
        match self {
            Address::V4(_) => AddressFamily::V4,
            Address::V6(_) => AddressFamily::V6,
        }
    }

    pub fn is_loopback(&self) -> bool {
        match self {
            Address::V4(v4) => v4.is_loopback(),
            Address::V6(v6) => v6.is_loopback(),
        }
    }

    pub fn is_link_local(&self) -> bool {
        match self {
            Address::V4(v4) => v4.is_link_local(),
            Address::V6(v6) => v6.is_unicast_link_local(),
        }
    }

    pub fn is_multicast(&self) -> bool {
        match self {
            Address::V4(v4) => v4.is_multicast(),
            Address::V6(v6) => v6.is_multicast(),
        }
    }

    /// Unique-local is a V6-only concept; always false for V4.
    pub fn is_unique_local(&self) -> bool {
        match self {
            Address::V4(_) => false,
            Address::V6(v6) => v6.is_unique_local(),
        }
    }

    /// Whether the address is scoped to this machine or its local segment.
    ///
    /// The V4 arm treats the entire 127.0.0.0/8 block as local, not just
    /// 127.0.0.1.
    pub fn is_local(&self) -> bool {
        self.is_loopback() || self.is_link_local() || self.is_multicast() || self.is_unique_local()
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4(v4),
            IpAddr::V6(v6) => Address::V6(v6),
        }
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> Self {
        match addr {
            Address::V4(v4) => IpAddr::V4(v4),
            Address::V6(v6) => IpAddr::V6(v6),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(v4: Ipv4Addr) -> Self {
        Address::V4(v4)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(v6: Ipv6Addr) -> Self {
        Address::V6(v6)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(v4) => write!(f, "{v4}"),
            Address::V6(v6) => write!(f, "{v6}"),
        }
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(Address::from)
            .map_err(|_| ParseAddressError(s.to_string()))
    }
}

crate::network::impl_string_serde!(Address);

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
