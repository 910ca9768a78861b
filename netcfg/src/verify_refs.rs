//! Port-group reference checks.
//!
//! Any port a host names that is not a number, range or list of those is a
//! port-group name and must exist in the port-group catalog. Hairpin entries
//! that target the external address group also need that group to hold
//! something.

use crate::catalog::PortGroupCatalog;
use crate::emit::is_plain_port;
use crate::model::{ExternalAddresses, Host, Network, EXTERNAL_GROUP};
use crate::synthesis::ForwardPort;
use crate::verify_networks::VerifyFinding;

/// Unknown port groups referenced by any host of `network`.
pub fn port_group_reference_findings(
    network: &Network,
    catalog: &dyn PortGroupCatalog,
) -> Vec<VerifyFinding> {
    let mut out = Vec::new();
    for host in network.hosts() {
        for name in referenced_port_groups(host) {
            if !catalog.has_port_group(&name) {
                out.push(VerifyFinding::error(
                    "missing_port_group",
                    format!("{host}: port group '{name}' is not defined"),
                ));
            }
        }
    }
    out
}

/// Warn when hosts hairpin to the external group while it is empty.
pub fn external_group_findings(
    networks: &[Network],
    external: &ExternalAddresses,
) -> Vec<VerifyFinding> {
    if !external.addresses().is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for host in networks.iter().flat_map(Network::hosts) {
        let uses_external = host
            .hairpin_ports()
            .iter()
            .any(|h| h.destination.address.as_deref() == Some(EXTERNAL_GROUP));
        if uses_external {
            out.push(VerifyFinding::warning(
                "empty_external_addresses",
                format!("{host}: hairpin targets '{EXTERNAL_GROUP}' but no external addresses are configured"),
            ));
        }
    }
    out
}

/// Port-group names in a host's connections, forwards and hairpins, in
/// declaration order and without repeats.
fn referenced_port_groups(host: &Host) -> Vec<String> {
    let mut ports = Vec::new();
    for connection in host.connections() {
        ports.extend(connection.source.port.clone());
        ports.extend(connection.destination.port.clone());
    }
    for forward in host.forward_ports() {
        match forward {
            ForwardPort::Port(port) => ports.push(port),
            ForwardPort::Translated { external, internal } => {
                ports.push(external);
                ports.push(internal);
            }
        }
    }
    for hairpin in host.hairpin_ports() {
        ports.extend(hairpin.destination.port);
    }

    let mut names: Vec<String> = Vec::new();
    for port in ports {
        if !is_plain_port(&port) && !names.contains(&port) {
            names.push(port);
        }
    }
    names
}
