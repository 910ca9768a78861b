//! Network-level consistency checks.
//!
//! These checks look across entities that structural validation sees only one
//! at a time:
//!
//! 1. **Subnet overlap**: no two networks may share address space.
//! 2. **Containment**: host addresses, the default router and the DHCP range
//!    must sit inside the network's CIDR block.
//! 3. **Host uniqueness**: no two hosts of a network share a MAC or address.
//! 4. **Firewall directions**: an interface carries at most one firewall per
//!    direction.
//!
//! A network whose CIDR does not parse is skipped here; structural
//! validation already reports it.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::model::Network;
use crate::verify_dupes::duplicates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyFinding {
    pub severity: FindingSeverity,
    pub code: String,
    pub message: String,
}

impl VerifyFinding {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Error,
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Warning,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Run every network-level check.
///
/// # Arguments
///
/// * `networks` - Networks of one configuration tree, in load order
///
/// # Returns
///
/// All findings, overlap first, then per-network checks in network order.
pub fn network_findings(networks: &[Network]) -> Vec<VerifyFinding> {
    let mut out = overlap_findings(networks);
    for network in networks {
        out.extend(containment_findings(network));
        out.extend(host_duplicate_findings(network));
        out.extend(firewall_direction_findings(network));
    }
    out
}

/// Index pairs `(i, j)` with `i < j` whose blocks overlap.
///
/// Two CIDR blocks overlap exactly when one contains the other.
pub fn overlapping_pairs(blocks: &[IpNet]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (i, a) in blocks.iter().enumerate() {
        for (j, b) in blocks.iter().enumerate().skip(i + 1) {
            if a.contains(b) || b.contains(a) {
                out.push((i, j));
            }
        }
    }
    out
}

fn overlap_findings(networks: &[Network]) -> Vec<VerifyFinding> {
    let parsed = networks
        .iter()
        .filter_map(|n| n.cidr().map(|cidr| (n, cidr)))
        .collect::<Vec<_>>();
    let blocks = parsed.iter().map(|(_, cidr)| *cidr).collect::<Vec<_>>();
    overlapping_pairs(&blocks)
        .into_iter()
        .map(|(i, j)| {
            let (a, a_cidr) = parsed[i];
            let (b, b_cidr) = parsed[j];
            VerifyFinding::error(
                "network_overlap",
                format!("{a} ({a_cidr}) overlaps {b} ({b_cidr})"),
            )
        })
        .collect()
}

fn containment_findings(network: &Network) -> Vec<VerifyFinding> {
    let Some(cidr) = network.cidr() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for host in network.hosts() {
        let Some(address) = host.address() else {
            continue;
        };
        if parse_ip(&address).is_some_and(|ip| !cidr.contains(&ip)) {
            out.push(VerifyFinding::error(
                "address_outside_network",
                format!("{host}: address {address} is outside {cidr}"),
            ));
        }
    }

    let d = network.descriptor();
    if let Some(router) = d.text("default-router") {
        if parse_ip(&router).is_some_and(|ip| !cidr.contains(&ip)) {
            out.push(VerifyFinding::error(
                "address_outside_network",
                format!("{network}: default-router {router} is outside {cidr}"),
            ));
        }
    }
    let start = d.text("dhcp-start");
    let stop = d.text("dhcp-stop");
    for (name, value) in [("dhcp-start", &start), ("dhcp-stop", &stop)] {
        let Some(value) = value else {
            continue;
        };
        if parse_ip(value).is_some_and(|ip| !cidr.contains(&ip)) {
            out.push(VerifyFinding::error(
                "address_outside_network",
                format!("{network}: {name} {value} is outside {cidr}"),
            ));
        }
    }
    if let (Some(lo), Some(hi)) = (
        start.as_deref().and_then(parse_ip),
        stop.as_deref().and_then(parse_ip),
    ) {
        if lo > hi {
            out.push(VerifyFinding::error(
                "dhcp_range_inverted",
                format!("{network}: dhcp-start {lo} is after dhcp-stop {hi}"),
            ));
        }
    }
    if start.is_some() != stop.is_some() {
        out.push(VerifyFinding::error(
            "dhcp_range_incomplete",
            format!("{network}: dhcp-start and dhcp-stop must be given together"),
        ));
    }
    out
}

fn host_duplicate_findings(network: &Network) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    let macs = network
        .hosts()
        .iter()
        .filter_map(|h| h.mac())
        .map(|mac| mac.to_ascii_lowercase());
    for mac in duplicates(macs) {
        out.push(VerifyFinding::error(
            "duplicate_mac",
            format!("{network}: MAC {mac} is used by more than one host"),
        ));
    }
    let addresses = network.hosts().iter().filter_map(|h| h.address());
    for address in duplicates(addresses) {
        out.push(VerifyFinding::error(
            "duplicate_host_address",
            format!("{network}: address {address} is used by more than one host"),
        ));
    }
    out
}

fn firewall_direction_findings(network: &Network) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    for interface in network.interfaces() {
        let directions = interface.firewalls().iter().map(|f| f.direction());
        for direction in duplicates(directions) {
            out.push(VerifyFinding::error(
                "duplicate_firewall_direction",
                format!("{interface}: more than one '{direction}' firewall"),
            ));
        }
    }
    out
}

fn parse_ip(text: &str) -> Option<IpAddr> {
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use ipnet::IpNet;
    use pretty_assertions::assert_eq;

    use super::{network_findings, overlapping_pairs};
    use crate::attributes::Attributes;
    use crate::model::{Direction, Firewall, Host, Interface, Nat, Network};

    fn yaml(text: &str) -> Attributes {
        serde_yaml::from_str(text).expect("yaml")
    }

    fn codes(network: Network) -> Vec<String> {
        network_findings(&[network])
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    #[test]
    fn pairwise_overlap_reports_each_pair_once() {
        let blocks = ["10.0.0.0/22", "10.0.1.0/24", "10.0.2.0/23", "10.0.2.0/24"]
            .iter()
            .map(|b| b.parse::<IpNet>().expect("cidr"))
            .collect::<Vec<_>>();
        assert_eq!(overlapping_pairs(&blocks), vec![(0, 1), (0, 2), (0, 3), (2, 3)]);
    }

    #[test]
    fn overlap_findings_name_both_networks() {
        let networks = vec![
            Network::new("lan", yaml("cidr: 10.0.0.0/22")),
            Network::new("dmz", yaml("cidr: 10.0.1.0/24")),
        ];
        let findings = network_findings(&networks);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Network lan (10.0.0.0/22) overlaps Network dmz (10.0.1.0/24)"
        );
    }

    #[test]
    fn host_outside_subnet_and_duplicate_mac() {
        let mut network = Network::new("lan", yaml("cidr: 10.0.0.0/24"));
        let mut nat = Nat::default();
        for (name, address) in [("a", "10.0.0.5"), ("b", "10.0.1.5")] {
            let host = Host::new(
                name,
                "lan",
                network.cidr_text(),
                yaml(&format!("address: {address}\nmac: 'AA:bb:cc:dd:ee:ff'")),
            );
            network.add_host(host, &mut nat).expect("add host");
        }
        assert_eq!(codes(network), vec!["address_outside_network", "duplicate_mac"]);
    }

    #[test]
    fn dhcp_range_must_be_ordered_and_inside() {
        let network = Network::new(
            "lan",
            yaml("cidr: 10.0.0.0/24\ndefault-router: 10.0.1.1\ndhcp-start: 10.0.0.200\ndhcp-stop: 10.0.0.100"),
        );
        assert_eq!(codes(network), vec!["address_outside_network", "dhcp_range_inverted"]);
    }

    #[test]
    fn two_inbound_firewalls_on_one_interface() {
        let mut network = Network::new("lan", yaml("cidr: 10.0.0.0/24"));
        let mut interface = Interface::new("eth1", Attributes::new());
        interface.attach(Firewall::new("lan-in", Direction::In, Attributes::new()));
        interface.attach(Firewall::new("lan-in-2", Direction::In, Attributes::new()));
        network.add_interface(interface);
        assert_eq!(codes(network), vec!["duplicate_firewall_direction"]);
    }
}
