//! # Interface Directory
//!
//! Aggregates raw per-family interface records into one entry per interface
//! name, attaching a derived type classification. Pure transformation: the
//! records come from an [`IfaddrSource`] and the optional link details from
//! a [`LinkRegistry`], so the whole pipeline runs against mock suppliers in
//! tests.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use pnet::ipnetwork::IpNetwork;
use tracing::debug;

use netatlas_common::network::address::Address;

/// Family of a raw record as observed by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFamily {
    V4,
    V6,
    Link,
    Other,
}

/// One raw observation: an (interface name, address family) tuple.
#[derive(Debug, Clone)]
pub struct IfaddrRecord {
    pub name: String,
    pub index: u32,
    pub family: RecordFamily,
    pub address: Option<Address>,
    pub netmask: Option<Address>,
    pub broadcast: Option<Address>,
    pub is_up: bool,
    pub is_running: bool,
    pub is_loopback: bool,
    pub supports_multicast: bool,
}

/// Derived interface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Wifi,
    Cellular,
    WiredEthernet,
    Bridge,
    Loopback,
    Other,
}

/// An aggregated network interface, rebuilt fresh on every enumeration.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub index: u32,
    pub ipv4: Vec<Ipv4Addr>,
    pub ipv6: Vec<Ipv6Addr>,
    pub ipv4_netmask: Option<Ipv4Addr>,
    pub ipv6_netmask: Option<Ipv6Addr>,
    pub ipv4_broadcast: Option<Ipv4Addr>,
    pub ipv6_broadcast: Option<Ipv6Addr>,
    pub hardware_address: Option<String>,
    pub gateway: Option<Address>,
    pub is_up: bool,
    pub is_running: bool,
    pub is_loopback: bool,
    pub supports_multicast: bool,
    pub kind: InterfaceKind,
}

/// Supplier of raw per-family records.
pub trait IfaddrSource {
    fn records(&self) -> Vec<IfaddrRecord>;
}

/// Supplier of per-interface link details the record list cannot carry.
/// Every method may answer `None`; the directory degrades gracefully.
pub trait LinkRegistry {
    fn hardware_address(&self, name: &str) -> Option<String>;
    fn gateway(&self, name: &str) -> Option<Address>;
    /// Authoritative platform answer for the interface type, if any.
    fn kind_hint(&self, name: &str) -> Option<InterfaceKind>;
}

/// Enumerates this machine's interfaces through the platform suppliers.
pub fn list_interfaces() -> Vec<Interface> {
    aggregate(&PnetSource, &SystemRegistry)
}

/// Groups records by interface name, merges flags from the first observed
/// record, and sorts by system index ascending. Tolerates V6-only
/// interfaces, missing hardware addresses and an empty record set.
pub fn aggregate(source: &dyn IfaddrSource, registry: &dyn LinkRegistry) -> Vec<Interface> {
    let mut grouped: HashMap<String, Interface> = HashMap::new();

    for record in source.records() {
        let entry = grouped
            .entry(record.name.clone())
            .or_insert_with(|| Interface {
                name: record.name.clone(),
                index: record.index,
                ipv4: Vec::new(),
                ipv6: Vec::new(),
                ipv4_netmask: None,
                ipv6_netmask: None,
                ipv4_broadcast: None,
                ipv6_broadcast: None,
                hardware_address: None,
                gateway: None,
                is_up: record.is_up,
                is_running: record.is_running,
                is_loopback: record.is_loopback,
                supports_multicast: record.supports_multicast,
                kind: InterfaceKind::Other,
            });

        match record.family {
            RecordFamily::V4 => {
                if let Some(Address::V4(addr)) = record.address {
                    entry.ipv4.push(addr);
                }
                if let Some(Address::V4(mask)) = record.netmask {
                    entry.ipv4_netmask.get_or_insert(mask);
                }
                if let Some(Address::V4(bcast)) = record.broadcast {
                    entry.ipv4_broadcast.get_or_insert(bcast);
                }
            }
            RecordFamily::V6 => {
                if let Some(Address::V6(addr)) = record.address {
                    entry.ipv6.push(addr);
                }
                if let Some(Address::V6(mask)) = record.netmask {
                    entry.ipv6_netmask.get_or_insert(mask);
                }
                if let Some(Address::V6(bcast)) = record.broadcast {
                    entry.ipv6_broadcast.get_or_insert(bcast);
                }
            }
            RecordFamily::Link | RecordFamily::Other => {}
        }
    }

    let mut interfaces: Vec<Interface> = grouped.into_values().collect();
    for interface in &mut interfaces {
        interface.hardware_address = registry.hardware_address(&interface.name);
        interface.gateway = registry.gateway(&interface.name);
        interface.kind = derive_kind(
            &interface.name,
            interface.is_loopback,
            registry.kind_hint(&interface.name),
        );
    }
    interfaces.sort_by_key(|interface| interface.index);

    debug!(count = interfaces.len(), "aggregated interface directory");
    interfaces
}

/// Precedence: platform registry hint, then the loopback flag, then the
/// name heuristics.
fn derive_kind(name: &str, is_loopback: bool, hint: Option<InterfaceKind>) -> InterfaceKind {
    if let Some(kind) = hint {
        return kind;
    }
    if is_loopback {
        return InterfaceKind::Loopback;
    }
    kind_for_name(name)
}

/// Ordered first-match-wins name heuristics, used when the platform registry
/// has no authoritative answer and the loopback flag is unset.
const KIND_RULES: &[(fn(&str) -> bool, InterfaceKind)] = &[
    (|name| name.starts_with("lo"), InterfaceKind::Loopback),
    (|name| name == "en0", InterfaceKind::Wifi),
    (
        |name| name.starts_with("wlan") || name.starts_with("wl"),
        InterfaceKind::Wifi,
    ),
    (
        |name| name.starts_with("en") || name.starts_with("eth"),
        InterfaceKind::WiredEthernet,
    ),
    (
        |name| name.starts_with("bridge") || name.starts_with("br-"),
        InterfaceKind::Bridge,
    ),
    (
        |name| {
            name.starts_with("utun")
                || name.starts_with("tun")
                || name.starts_with("tap")
                || name.starts_with("ipsec")
                || name.starts_with("wg")
        },
        InterfaceKind::Other,
    ),
    (
        |name| name.starts_with("pdp_ip") || name.starts_with("rmnet") || name.starts_with("wwan"),
        InterfaceKind::Cellular,
    ),
];

fn kind_for_name(name: &str) -> InterfaceKind {
    KIND_RULES
        .iter()
        .find(|(matches, _)| matches(name))
        .map(|(_, kind)| *kind)
        .unwrap_or(InterfaceKind::Other)
}

/// Flattens `pnet::datalink::interfaces()` into one record per
/// (name, address) observation; address-less interfaces surface as a single
/// link-family record so they still appear in the directory.
pub struct PnetSource;

impl IfaddrSource for PnetSource {
    fn records(&self) -> Vec<IfaddrRecord> {
        let mut records = Vec::new();
        for interface in pnet::datalink::interfaces() {
            let template = IfaddrRecord {
                name: interface.name.clone(),
                index: interface.index,
                family: RecordFamily::Link,
                address: None,
                netmask: None,
                broadcast: None,
                is_up: interface.is_up(),
                is_running: interface.is_running(),
                is_loopback: interface.is_loopback(),
                supports_multicast: interface.is_multicast(),
            };

            if interface.ips.is_empty() {
                records.push(template);
                continue;
            }
            for network in &interface.ips {
                let mut record = template.clone();
                match network {
                    IpNetwork::V4(v4) => {
                        record.family = RecordFamily::V4;
                        record.address = Some(Address::V4(v4.ip()));
                        record.netmask = Some(Address::V4(v4.mask()));
                        record.broadcast = Some(Address::V4(v4.broadcast()));
                    }
                    IpNetwork::V6(v6) => {
                        record.family = RecordFamily::V6;
                        record.address = Some(Address::V6(v6.ip()));
                        record.netmask = Some(Address::V6(v6.mask()));
                    }
                }
                records.push(record);
            }
        }
        records
    }
}

/// Platform-backed [`LinkRegistry`]: pnet for the hardware address, the
/// OS-specific registry for kind hints and the default gateway.
pub struct SystemRegistry;

impl LinkRegistry for SystemRegistry {
    fn hardware_address(&self, name: &str) -> Option<String> {
        pnet::datalink::interfaces()
            .into_iter()
            .find(|interface| interface.name == name)
            .and_then(|interface| interface.mac)
            .map(|mac| mac.to_string())
    }

    fn gateway(&self, name: &str) -> Option<Address> {
        platform::default_gateway(name)
    }

    fn kind_hint(&self, name: &str) -> Option<InterfaceKind> {
        platform::kind_hint(name)
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use std::fs;
    use std::net::Ipv4Addr;
    use std::path::Path;

    use netatlas_common::network::address::Address;

    use super::InterfaceKind;

    pub fn kind_hint(name: &str) -> Option<InterfaceKind> {
        let class = Path::new("/sys/class/net").join(name);
        if !class.join("device").exists() {
            return None;
        }
        if class.join("wireless").exists() {
            Some(InterfaceKind::Wifi)
        } else {
            Some(InterfaceKind::WiredEthernet)
        }
    }

    /// Owner of the default route per `/proc/net/route` (destination
    /// 00000000, gateway stored as little-endian hex).
    pub fn default_gateway(name: &str) -> Option<Address> {
        let table = fs::read_to_string("/proc/net/route").ok()?;
        for line in table.lines().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 || fields[0] != name || fields[1] != "00000000" {
                continue;
            }
            let raw = u32::from_str_radix(fields[2], 16).ok()?;
            if raw == 0 {
                continue;
            }
            return Some(Address::V4(Ipv4Addr::from(raw.to_le_bytes())));
        }
        None
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use std::collections::HashMap;
    use std::process::Command;
    use std::sync::OnceLock;

    use netatlas_common::network::address::Address;

    use super::InterfaceKind;

    /// Device name -> hardware port label, cached after the first shell-out.
    fn hardware_ports() -> &'static HashMap<String, String> {
        static PORTS: OnceLock<HashMap<String, String>> = OnceLock::new();
        PORTS.get_or_init(|| {
            let mut ports = HashMap::new();
            if let Ok(output) = Command::new("networksetup")
                .arg("-listallhardwareports")
                .output()
            {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let mut current_port: Option<String> = None;
                for line in stdout.lines() {
                    if let Some(port) = line.strip_prefix("Hardware Port: ") {
                        current_port = Some(port.trim().to_string());
                    } else if let Some(device) = line.strip_prefix("Device: ") {
                        if let Some(port) = current_port.take() {
                            ports.insert(device.trim().to_string(), port);
                        }
                    }
                }
            }
            ports
        })
    }

    pub fn kind_hint(name: &str) -> Option<InterfaceKind> {
        let port = hardware_ports().get(name)?;
        if port.contains("Wi-Fi") || port.contains("AirPort") {
            Some(InterfaceKind::Wifi)
        } else if port.contains("Bridge") {
            Some(InterfaceKind::Bridge)
        } else if port.contains("Ethernet") || port.contains("LAN") {
            Some(InterfaceKind::WiredEthernet)
        } else {
            None
        }
    }

    pub fn default_gateway(_name: &str) -> Option<Address> {
        None
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod platform {
    use netatlas_common::network::address::Address;

    use super::InterfaceKind;

    pub fn kind_hint(_name: &str) -> Option<InterfaceKind> {
        None
    }

    pub fn default_gateway(_name: &str) -> Option<Address> {
        None
    }
}

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

    struct StaticSource(Vec<IfaddrRecord>);

    impl IfaddrSource for StaticSource {
        fn records(&self) -> Vec<IfaddrRecord> {
            self.0.clone()
        }
    }

    struct StaticRegistry {
        mac: Option<String>,
        hint: Option<InterfaceKind>,
    }

    impl StaticRegistry {
        fn empty() -> Self {
            Self { mac: None, hint: None }
        }
    }

    impl LinkRegistry for StaticRegistry {
        fn hardware_address(&self, _name: &str) -> Option<String> {
            self.mac.clone()
        }

        fn gateway(&self, _name: &str) -> Option<Address> {
            None
        }

        fn kind_hint(&self, _name: &str) -> Option<InterfaceKind> {
            self.hint
        }
    }

    fn record(name: &str, index: u32, family: RecordFamily, address: &str) -> IfaddrRecord {
        IfaddrRecord {
            name: name.to_string(),
            index,
            family,
            address: Some(address.parse().unwrap()),
            netmask: None,
            broadcast: None,
            is_up: true,
            is_running: true,
            is_loopback: false,
            supports_multicast: true,
        }
    }

    #[test]
    fn groups_families_under_one_name() {
        let source = StaticSource(vec![
            record("eth0", 2, RecordFamily::V4, "192.168.1.5"),
            record("eth0", 2, RecordFamily::V6, "fe80::1"),
        ]);
        let interfaces = aggregate(&source, &StaticRegistry::empty());
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].ipv4.len(), 1);
        assert_eq!(interfaces[0].ipv6.len(), 1);
    }

    #[test]
    fn tolerates_v6_only_interfaces() {
        let source = StaticSource(vec![record("utun3", 7, RecordFamily::V6, "fe80::9")]);
        let interfaces = aggregate(&source, &StaticRegistry::empty());
        assert_eq!(interfaces.len(), 1);
        assert!(interfaces[0].ipv4.is_empty());
        assert_eq!(interfaces[0].ipv6.len(), 1);
        assert!(interfaces[0].hardware_address.is_none());
    }

    #[test]
    fn empty_record_set_is_not_an_error() {
        assert!(aggregate(&StaticSource(vec![]), &StaticRegistry::empty()).is_empty());
    }

    #[test]
    fn sorted_by_system_index() {
        let source = StaticSource(vec![
            record("wlan0", 9, RecordFamily::V4, "10.0.0.2"),
            record("eth0", 2, RecordFamily::V4, "10.0.0.1"),
        ]);
        let interfaces = aggregate(&source, &StaticRegistry::empty());
        let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["eth0", "wlan0"]);
    }

    #[test]
    fn flags_come_from_the_first_observed_record() {
        let mut first = record("eth0", 2, RecordFamily::V4, "10.0.0.1");
        first.is_up = false;
        let mut second = record("eth0", 2, RecordFamily::V6, "fe80::1");
        second.is_up = true;
        let interfaces = aggregate(&StaticSource(vec![first, second]), &StaticRegistry::empty());
        assert!(!interfaces[0].is_up);
    }

    #[test]
    fn registry_hint_beats_everything() {
        let mut r = record("lo0", 1, RecordFamily::V4, "127.0.0.1");
        r.is_loopback = true;
        let registry = StaticRegistry {
            mac: None,
            hint: Some(InterfaceKind::Wifi),
        };
        let interfaces = aggregate(&StaticSource(vec![r]), &registry);
        assert_eq!(interfaces[0].kind, InterfaceKind::Wifi);
    }

    #[test]
    fn loopback_flag_beats_name_heuristics() {
        let mut r = record("weird7", 1, RecordFamily::V4, "127.0.0.1");
        r.is_loopback = true;
        let interfaces = aggregate(&StaticSource(vec![r]), &StaticRegistry::empty());
        assert_eq!(interfaces[0].kind, InterfaceKind::Loopback);
    }

    #[test]
    fn name_rule_table_first_match_wins() {
        let cases = [
            ("lo0", InterfaceKind::Loopback),
            ("en0", InterfaceKind::Wifi),
            ("en1", InterfaceKind::WiredEthernet),
            ("eth2", InterfaceKind::WiredEthernet),
            ("wlan0", InterfaceKind::Wifi),
            ("bridge100", InterfaceKind::Bridge),
            ("br-24ab9c", InterfaceKind::Bridge),
            ("utun4", InterfaceKind::Other),
            ("wg0", InterfaceKind::Other),
            ("rmnet0", InterfaceKind::Cellular),
            ("pdp_ip0", InterfaceKind::Cellular),
            ("veth12", InterfaceKind::Other),
        ];
        for (name, kind) in cases {
            assert_eq!(kind_for_name(name), kind, "{name}");
        }
    }

    #[test]
    fn hardware_address_is_attached_when_known() {
        let registry = StaticRegistry {
            mac: Some("aa:bb:cc:dd:ee:ff".to_string()),
            hint: None,
        };
        let source = StaticSource(vec![record("eth0", 2, RecordFamily::V4, "10.0.0.1")]);
        let interfaces = aggregate(&source, &registry);
        assert_eq!(
            interfaces[0].hardware_address.as_deref(),
            Some("aa:bb:cc:dd:ee:ff")
        );
    }
}
