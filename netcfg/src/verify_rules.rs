//! Rule numbering and connection checks.
//!
//! Explicit rule numbers written on host connections are checked twice: among
//! the host's own connections, and against every other rule already present
//! in the firewall the connection lands in. Synthesis never rejects a taken
//! number, so this is where such collisions surface.

use crate::model::{Host, Nat, Network, RuleOrigin};
use crate::verify_dupes::duplicates;
use crate::verify_networks::VerifyFinding;

/// Findings for every host of `network`.
pub fn host_rule_findings(network: &Network) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    for host in network.hosts() {
        out.extend(connection_side_findings(host));
        out.extend(declared_number_findings(host));
        out.extend(collision_findings(network, host));
    }
    out
}

pub fn nat_rule_findings(nat: &Nat) -> Vec<VerifyFinding> {
    duplicates(nat.rules().iter().map(|r| r.number()))
        .into_iter()
        .map(|number| {
            VerifyFinding::error(
                "duplicate_nat_rule",
                format!("NAT: rule number {number} is used more than once"),
            )
        })
        .collect()
}

fn connection_side_findings(host: &Host) -> Vec<VerifyFinding> {
    host.connections()
        .iter()
        .filter(|c| !c.involves(host))
        .map(|c| {
            VerifyFinding::error(
                "connection_without_host",
                format!(
                    "{host}: connection {} names neither the host address nor one of its address groups",
                    c.index + 1
                ),
            )
        })
        .collect()
}

fn declared_number_findings(host: &Host) -> Vec<VerifyFinding> {
    duplicates(host.connections().iter().filter_map(|c| c.rule))
        .into_iter()
        .map(|number| {
            VerifyFinding::error(
                "duplicate_host_rule",
                format!("{host}: rule number {number} is declared by more than one connection"),
            )
        })
        .collect()
}

fn collision_findings(network: &Network, host: &Host) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    for connection in host.connections() {
        let Some(number) = connection.rule else {
            continue;
        };
        let Some(firewall) = network.firewall(connection.direction(host)) else {
            continue;
        };
        let taken = firewall
            .rules()
            .iter()
            .any(|r| r.number() == number && !same_host(r.origin(), host));
        if taken {
            out.push(VerifyFinding::error(
                "rule_number_collision",
                format!(
                    "{host}: rule number {number} is already used in firewall {}",
                    firewall.name()
                ),
            ));
        }
    }
    out
}

/// Collisions between a host's own connections are reported as duplicates instead.
fn same_host(origin: &RuleOrigin, host: &Host) -> bool {
    matches!(origin, RuleOrigin::Connection { host: name, .. } if name == host.name())
}
