//! # CIDR Range Engine
//!
//! Parses `address/prefix` notation and derives the subnet mask, network and
//! broadcast addresses, usable-host count, and indexed access into the
//! usable-host space. All arithmetic runs at the family's native width: a
//! 32-bit word for V4, a 128-bit word for V6, both big-endian.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::{Bound, RangeBounds};
use std::str::FromStr;

use thiserror::Error;

use crate::network::address::{Address, AddressFamily};

/// Upper bound on hosts materialized by an open-ended [`IpAddressRange::hosts`]
/// span, so a `/0`-sized range cannot be expanded by accident.
pub const MAX_OPEN_ENDED_HOSTS: u64 = 1000;

/// A CIDR range: a base address plus a prefix length clamped to the
/// family's width. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpAddressRange {
    base: Address,
    prefix_len: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRangeError {
    #[error("invalid address in CIDR range: {0}")]
    InvalidAddress(String),
    #[error("invalid prefix length in CIDR range: {0}")]
    InvalidPrefix(String),
}

fn mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix.min(32)))
    }
}

fn mask_v6(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix.min(128)))
    }
}

impl IpAddressRange {
    /// Builds a range from an already-parsed address, clamping the prefix
    /// to the family width.
    pub fn new(base: Address, prefix_len: u8) -> Self {
        Self {
            base,
            prefix_len: prefix_len.min(base.family().width()),
        }
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> AddressFamily {
        self.base.family()
    }

    /// A `/32` (V4) or `/128` (V6) range covering exactly the base address.
    pub fn is_single_host(&self) -> bool {
        self.prefix_len == self.family().width()
    }

    /// `prefix_len` leading one-bits at the family width.
    pub fn subnet_mask(&self) -> Address {
        match self.base {
            Address::V4(_) => Address::V4(Ipv4Addr::from(mask_v4(self.prefix_len))),
            Address::V6(_) => Address::V6(Ipv6Addr::from(mask_v6(self.prefix_len))),
        }
    }

    /// Base address with all host bits cleared.
    pub fn network_address(&self) -> Address {
        match self.base {
            Address::V4(v4) => {
                Address::V4(Ipv4Addr::from(u32::from(v4) & mask_v4(self.prefix_len)))
            }
            Address::V6(v6) => {
                Address::V6(Ipv6Addr::from(u128::from(v6) & mask_v6(self.prefix_len)))
            }
        }
    }

    /// Network address with all host bits set.
    pub fn broadcast_address(&self) -> Address {
        match self.base {
            Address::V4(v4) => {
                let mask = mask_v4(self.prefix_len);
                Address::V4(Ipv4Addr::from((u32::from(v4) & mask) | !mask))
            }
            Address::V6(v6) => {
                let mask = mask_v6(self.prefix_len);
                Address::V6(Ipv6Addr::from((u128::from(v6) & mask) | !mask))
            }
        }
    }

    /// Number of assignable host addresses.
    ///
    /// Single-host ranges count 1 (the base address itself). Everything
    /// else follows `2^hostBits - 2` literally, so a V4 `/31` counts 0; no
    /// RFC 3021 special-casing. 64 or more host bits cannot be represented
    /// in a `u64` and saturate to `u64::MAX`, a documented approximation
    /// for ranges like `::/0`.
    pub fn usable_host_count(&self) -> u64 {
        if self.is_single_host() {
            return 1;
        }
        let host_bits = self.family().width() - self.prefix_len;
        if host_bits >= 64 {
            return u64::MAX;
        }
        (1u64 << host_bits).saturating_sub(2)
    }

    /// The usable host at `index`, or `None` past the end.
    ///
    /// Index 0 is network + 1; a single-host range answers only index 0,
    /// with the base address unmodified.
    pub fn host_at(&self, index: u64) -> Option<Address> {
        if self.is_single_host() {
            return (index == 0).then_some(self.base);
        }
        if index >= self.usable_host_count() {
            return None;
        }
        Some(match self.network_address() {
            Address::V4(v4) => {
                Address::V4(Ipv4Addr::from(u32::from(v4).wrapping_add(index as u32 + 1)))
            }
            Address::V6(v6) => Address::V6(Ipv6Addr::from(u128::from(v6) + u128::from(index) + 1)),
        })
    }

    pub fn first_usable(&self) -> Option<Address> {
        self.host_at(0)
    }

    pub fn last_usable(&self) -> Option<Address> {
        match self.usable_host_count() {
            0 => None,
            count => self.host_at(count - 1),
        }
    }

    /// Materializes the usable hosts whose indices fall inside `span`.
    ///
    /// Out-of-bounds indices are silently skipped. An open-ended span
    /// (`start..`) is capped at [`MAX_OPEN_ENDED_HOSTS`] results.
    pub fn hosts<R: RangeBounds<u64>>(&self, span: R) -> Vec<Address> {
        let start = match span.start_bound() {
            Bound::Included(&lo) => lo,
            Bound::Excluded(&lo) => lo.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let count = self.usable_host_count();
        let end = match span.end_bound() {
            Bound::Included(&hi) => hi.saturating_add(1).min(count),
            Bound::Excluded(&hi) => hi.min(count),
            Bound::Unbounded => count.min(start.saturating_add(MAX_OPEN_ENDED_HOSTS)),
        };
        (start..end).filter_map(|index| self.host_at(index)).collect()
    }

    /// True iff `candidate` shares this range's family and its masked form
    /// equals the network address.
    pub fn contains(&self, candidate: &Address) -> bool {
        match (self.base, candidate) {
            (Address::V4(base), Address::V4(other)) => {
                let mask = mask_v4(self.prefix_len);
                (u32::from(*other) & mask) == (u32::from(base) & mask)
            }
            (Address::V6(base), Address::V6(other)) => {
                let mask = mask_v6(self.prefix_len);
                (u128::from(*other) & mask) == (u128::from(base) & mask)
            }
            _ => false,
        }
    }

    /// Like [`contains`](Self::contains), but false for text that parses as
    /// no address family at all.
    pub fn contains_str(&self, text: &str) -> bool {
        text.parse::<Address>()
            .map(|candidate| self.contains(&candidate))
            .unwrap_or(false)
    }
}

impl fmt::Display for IpAddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix_len)
    }
}

impl FromStr for IpAddressRange {
    type Err = ParseRangeError;

    /// Parses `<address>[/<prefix>]`. A missing prefix means the family
    /// maximum (single host); an oversized prefix is clamped, not rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };
        let base = addr_str
            .parse::<Address>()
            .map_err(|_| ParseRangeError::InvalidAddress(s.to_string()))?;
        let width = base.family().width();
        let prefix_len = match prefix_str {
            None => width,
            Some(text) => {
                let parsed = text
                    .parse::<u32>()
                    .map_err(|_| ParseRangeError::InvalidPrefix(s.to_string()))?;
                parsed.min(u32::from(width)) as u8
            }
        };
        Ok(Self { base, prefix_len })
    }
}

crate::network::impl_string_serde!(IpAddressRange);

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> IpAddressRange {
        text.parse().expect("test range should parse")
    }

    fn addr(text: &str) -> Address {
        text.parse().expect("test address should parse")
    }

    #[test]
    fn round_trips_canonical_form() {
        for text in ["192.168.1.0/24", "10.0.0.1/32", "2001:db8::/32", "::1/128"] {
            assert_eq!(range(text).to_string(), text);
        }
    }

    #[test]
    fn missing_prefix_defaults_to_single_host() {
        assert_eq!(range("10.0.0.1").to_string(), "10.0.0.1/32");
        assert_eq!(range("2001:db8::1").to_string(), "2001:db8::1/128");
        assert!(range("10.0.0.1").is_single_host());
    }

    #[test]
    fn oversized_prefix_is_clamped() {
        assert_eq!(range("192.168.0.1/40").to_string(), "192.168.0.1/32");
        assert_eq!(range("2001:db8::/200").to_string(), "2001:db8::/128");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            "999.1.2.3/24".parse::<IpAddressRange>(),
            Err(ParseRangeError::InvalidAddress(_))
        ));
        for text in ["192.168.1.0/abc", "192.168.1.0/-1", "192.168.1.0/"] {
            assert!(matches!(
                text.parse::<IpAddressRange>(),
                Err(ParseRangeError::InvalidPrefix(_))
            ));
        }
    }

    #[test]
    fn v4_subnet_mask_table() {
        let cases = [
            (8, "255.0.0.0"),
            (16, "255.255.0.0"),
            (24, "255.255.255.0"),
            (25, "255.255.255.128"),
            (30, "255.255.255.252"),
        ];
        for (prefix, mask) in cases {
            let r = range(&format!("10.0.0.0/{prefix}"));
            assert_eq!(r.subnet_mask(), addr(mask), "/{prefix}");
        }
        assert_eq!(range("10.0.0.0/0").subnet_mask(), addr("0.0.0.0"));
    }

    #[test]
    fn v6_subnet_mask() {
        assert_eq!(range("2001:db8::/32").subnet_mask(), addr("ffff:ffff::"));
        assert_eq!(
            range("2001:db8::/64").subnet_mask(),
            addr("ffff:ffff:ffff:ffff::")
        );
    }

    #[test]
    fn network_and_broadcast() {
        let r = range("192.168.1.42/24");
        assert_eq!(r.network_address(), addr("192.168.1.0"));
        assert_eq!(r.broadcast_address(), addr("192.168.1.255"));

        let r = range("172.16.5.10/20");
        assert_eq!(r.network_address(), addr("172.16.0.0"));
        assert_eq!(r.broadcast_address(), addr("172.16.15.255"));
    }

    #[test]
    fn mask_invariant_holds() {
        // All host bits of the network address are zero.
        for text in ["192.168.1.42/20", "10.1.2.3/8", "2001:db8::ff/48"] {
            let r = range(text);
            match (r.network_address(), r.subnet_mask()) {
                (Address::V4(network), Address::V4(mask)) => {
                    assert_eq!(u32::from(network) & !u32::from(mask), 0);
                }
                (Address::V6(network), Address::V6(mask)) => {
                    assert_eq!(u128::from(network) & !u128::from(mask), 0);
                }
                _ => unreachable!("network and mask families always agree"),
            }
        }
    }

    #[test]
    fn usable_count_table() {
        let cases = [(30, 2), (29, 6), (28, 14), (24, 254), (32, 1)];
        for (prefix, count) in cases {
            let r = range(&format!("192.168.1.0/{prefix}"));
            assert_eq!(r.usable_host_count(), count, "/{prefix}");
        }
    }

    #[test]
    fn slash_31_follows_the_formula() {
        // 2^1 - 2 = 0; deliberately no RFC 3021 carve-out.
        assert_eq!(range("10.0.0.0/31").usable_host_count(), 0);
        assert!(range("10.0.0.0/31").first_usable().is_none());
        assert!(range("10.0.0.0/31").last_usable().is_none());
    }

    #[test]
    fn huge_ranges_saturate() {
        assert_eq!(range("::/0").usable_host_count(), u64::MAX);
        assert_eq!(range("2001:db8::/32").usable_host_count(), u64::MAX);
        // 64 host bits is the first saturating width.
        assert_eq!(range("2001:db8::/64").usable_host_count(), u64::MAX);
        assert_eq!(
            range("2001:db8::/65").usable_host_count(),
            (1u64 << 63) - 2
        );
    }

    #[test]
    fn indexing_starts_past_network_address() {
        let r = range("192.168.1.0/24");
        assert_eq!(r.host_at(0), Some(addr("192.168.1.1")));
        assert_eq!(r.host_at(253), Some(addr("192.168.1.254")));
        assert_eq!(r.first_usable(), Some(addr("192.168.1.1")));
        assert_eq!(r.last_usable(), Some(addr("192.168.1.254")));
    }

    #[test]
    fn index_one_past_last_is_none() {
        let r = range("192.168.1.0/24");
        assert_eq!(r.host_at(r.usable_host_count()), None);
        assert_eq!(r.host_at(u64::MAX - 1), None);
    }

    #[test]
    fn single_host_answers_only_index_zero() {
        let r = range("192.168.1.100/32");
        assert_eq!(r.usable_host_count(), 1);
        assert_eq!(r.host_at(0), Some(addr("192.168.1.100")));
        assert_eq!(r.host_at(1), None);
        assert_eq!(r.first_usable(), r.last_usable());
    }

    #[test]
    fn v6_increment_carries_across_bytes() {
        let r = range("2001:db8::/112");
        assert_eq!(r.host_at(0), Some(addr("2001:db8::1")));
        // Index 254 is network + 255; one more carries into the next byte.
        assert_eq!(r.host_at(254), Some(addr("2001:db8::ff")));
        assert_eq!(r.host_at(255), Some(addr("2001:db8::100")));
        assert_eq!(r.last_usable(), Some(addr("2001:db8::fffe")));
    }

    #[test]
    fn containment_over_every_usable_host() {
        let r = range("10.20.30.0/28");
        for index in 0..r.usable_host_count() {
            let host = r.host_at(index).unwrap();
            assert!(r.contains(&host), "index {index}");
        }
        assert!(!r.contains(&addr("10.20.31.1")));
    }

    #[test]
    fn containment_rejects_family_mismatch() {
        let r = range("10.0.0.0/8");
        assert!(!r.contains(&addr("2001:db8::1")));
        assert!(r.contains_str("10.200.0.1"));
        assert!(!r.contains_str("garbage"));
    }

    #[test]
    fn hosts_skips_out_of_bounds_indices() {
        let r = range("192.168.1.0/30");
        assert_eq!(
            r.hosts(0..10),
            vec![addr("192.168.1.1"), addr("192.168.1.2")]
        );
        assert_eq!(r.hosts(1..=1), vec![addr("192.168.1.2")]);
        assert!(r.hosts(5..9).is_empty());
    }

    #[test]
    fn open_ended_hosts_are_capped() {
        let r = range("10.0.0.0/8");
        let hosts = r.hosts(0..);
        assert_eq!(hosts.len(), MAX_OPEN_ENDED_HOSTS as usize);
        assert_eq!(hosts[0], addr("10.0.0.1"));

        let offset = r.hosts(500..);
        assert_eq!(offset.len(), MAX_OPEN_ENDED_HOSTS as usize);
        assert_eq!(offset[0], r.host_at(500).unwrap());
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&range("192.168.1.0/24")).unwrap();
        assert_eq!(json, "\"192.168.1.0/24\"");
        let back: IpAddressRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range("192.168.1.0/24"));
        assert!(serde_json::from_str::<IpAddressRange>("\"1.2.3.4/x\"").is_err());
    }
}
