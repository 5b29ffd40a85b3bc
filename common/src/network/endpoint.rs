//! # Endpoint Model
//!
//! A `(host, port)` pair where the host may still be an unresolved name.
//! The canonical text form is `host:port`, with V6 hosts bracketed:
//! `example.com:80`, `10.0.0.1:443`, `[::1]:443`.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::network::address::Address;

/// The host half of an endpoint: a yet-unresolved name or a concrete
/// address. Closed set; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Host {
    Name(String),
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl Host {
    pub fn is_name(&self) -> bool {
        matches!(self, Host::Name(_))
    }

    /// The resolved address, if this host is not a bare name.
    pub fn address(&self) -> Option<Address> {
        match self {
            Host::Name(_) => None,
            Host::V4(v4) => Some(Address::V4(*v4)),
            Host::V6(v6) => Some(Address::V6(*v6)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: Host,
    port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEndpointError {
    #[error("endpoint has no port: {0}")]
    MissingPort(String),
    #[error("endpoint has an empty host: {0}")]
    EmptyHost(String),
    #[error("endpoint port must be 1-65535: {0}")]
    InvalidPort(String),
    #[error("unbalanced brackets in endpoint: {0}")]
    UnbalancedBrackets(String),
    #[error("invalid host in endpoint: {0}")]
    InvalidHost(String),
}

impl Endpoint {
    pub fn new(host: Host, port: u16) -> Self {
        Self { host, port }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Same port, different host. Used when a name has been resolved.
    pub fn with_host(&self, host: Host) -> Self {
        Self { host, port: self.port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Host::Name(name) => write!(f, "{name}:{}", self.port),
            Host::V4(v4) => write!(f, "{v4}:{}", self.port),
            Host::V6(v6) => write!(f, "[{v6}]:{}", self.port),
        }
    }
}

fn is_allowed_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_')
}

fn parse_port(text: &str, original: &str) -> Result<u16, ParseEndpointError> {
    match text.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ParseEndpointError::InvalidPort(original.to_string())),
    }
}

impl FromStr for Endpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Bracketed form is reserved for V6 literals.
        if let Some(rest) = s.strip_prefix('[') {
            let Some((host_str, port_str)) = rest.split_once("]:") else {
                return Err(ParseEndpointError::UnbalancedBrackets(s.to_string()));
            };
            let v6 = host_str
                .parse::<Ipv6Addr>()
                .map_err(|_| ParseEndpointError::InvalidHost(s.to_string()))?;
            let port = parse_port(port_str, s)?;
            return Ok(Endpoint::new(Host::V6(v6), port));
        }

        let Some((host_str, port_str)) = s.rsplit_once(':') else {
            return Err(ParseEndpointError::MissingPort(s.to_string()));
        };
        if host_str.is_empty() {
            return Err(ParseEndpointError::EmptyHost(s.to_string()));
        }
        if host_str.contains(':') || host_str.contains(']') {
            // A second colon means an unbracketed V6 literal; reject it.
            return Err(ParseEndpointError::InvalidHost(s.to_string()));
        }
        let port = parse_port(port_str, s)?;
        if let Ok(v4) = host_str.parse::<Ipv4Addr>() {
            return Ok(Endpoint::new(Host::V4(v4), port));
        }
        if !host_str.bytes().all(is_allowed_name_byte) {
            return Err(ParseEndpointError::InvalidHost(s.to_string()));
        }
        Ok(Endpoint::new(Host::Name(host_str.to_string()), port))
    }
}

crate::network::impl_string_serde!(Endpoint);

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
