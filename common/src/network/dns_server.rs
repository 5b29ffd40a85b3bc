//! A DNS server literal: a bare V4 or V6 address, no port.

use std::fmt;
use std::str::FromStr;

use crate::network::address::{Address, ParseAddressError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DnsServer(Address);

impl DnsServer {
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for DnsServer {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Display for DnsServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DnsServer {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Address>().map(Self)
    }
}

crate::network::impl_string_serde!(DnsServer);
