use std::fmt::{self, Display, Formatter};
use std::path::Path;

use command_diff_core::CommandSet;
use ipnet::IpNet;
use tracing::debug;

use super::firewall::{Direction, Firewall};
use super::host::Host;
use super::interface::Interface;
use super::nat::Nat;
use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::Result;
use crate::loader::{entry_name, list_configured_subdirectories, load_attributes, DESCRIPTOR};
use crate::predicates;
use crate::synthesis::{synthesize, NetworkContext};

/// Interface used for port forwards when a network names none.
pub const DEFAULT_WAN_INTERFACE: &str = "eth0";

pub const NETWORK_SCHEMA: Schema = Schema {
    fields: &[
        ("cidr", predicates::cidr),
        ("description", predicates::text),
        ("default-router", predicates::ip_address),
        ("dhcp-start", predicates::ip_address),
        ("dhcp-stop", predicates::ip_address),
        ("lease", predicates::positive_int),
        ("dns-servers", predicates::ip_list),
        ("domain-name", predicates::text),
        ("authoritative", predicates::flag),
        ("wan-interface", predicates::interface_name),
    ],
    required: &["cidr"],
};

const DHCP_SETTINGS: &[&str] = &[
    "default-router",
    "dhcp-start",
    "dhcp-stop",
    "lease",
    "dns-servers",
    "domain-name",
];

/// One routed subnet with its interfaces, hosts and DHCP service.
#[derive(Debug, Clone)]
pub struct Network {
    name: String,
    descriptor: Descriptor,
    interfaces: Vec<Interface>,
    hosts: Vec<Host>,
}

impl Network {
    pub fn new(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::new(attributes, &NETWORK_SCHEMA),
            interfaces: Vec::new(),
            hosts: Vec::new(),
        }
    }

    /// Load `networks/<name>/`: interfaces first so that every host finds its
    /// firewalls, then hosts, synthesizing each host's policy as it is added.
    pub fn load(dir: &Path, nat: &mut Nat) -> Result<Self> {
        let name = entry_name(dir)?;
        let mut network = Self::new(&name, load_attributes(&dir.join(DESCRIPTOR))?);
        for if_dir in list_configured_subdirectories(&[dir.join("interfaces")])? {
            network.interfaces.push(Interface::load(&if_dir, &name)?);
        }
        for host_dir in list_configured_subdirectories(&[dir.join("hosts")])? {
            let host = Host::load(&host_dir, &name, network.cidr_text())?;
            network.add_host(host, nat)?;
        }
        debug!(
            network = %name,
            interfaces = network.interfaces.len(),
            hosts = network.hosts.len(),
            "loaded network"
        );
        Ok(network)
    }

    pub fn add_interface(&mut self, interface: Interface) {
        self.interfaces.push(interface);
    }

    /// Synthesize `host`'s rules into this network's firewalls and `nat`,
    /// then take ownership of the host.
    pub fn add_host(&mut self, host: Host, nat: &mut Nat) -> Result<()> {
        let mut ctx = NetworkContext {
            network: self.name.clone(),
            wan_interface: self.wan_interface(),
            primary_interface: self.interfaces.first().map(|i| i.name().to_string()),
            interfaces: &mut self.interfaces,
            nat,
        };
        synthesize(&host, &mut ctx)?;
        self.hosts.push(host);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn cidr(&self) -> Option<IpNet> {
        self.descriptor.text("cidr").and_then(|c| c.parse().ok())
    }

    pub fn cidr_text(&self) -> Option<String> {
        self.descriptor.text("cidr")
    }

    pub fn wan_interface(&self) -> String {
        self.descriptor
            .text("wan-interface")
            .unwrap_or_else(|| DEFAULT_WAN_INTERFACE.to_string())
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// The firewall synthesis uses for `direction`: the first one attached.
    pub fn firewall(&self, direction: Direction) -> Option<&Firewall> {
        self.interfaces
            .iter()
            .find_map(|interface| interface.firewall(direction))
    }

    /// Host memberships, each firewall, each interface, then DHCP.
    pub fn commands(&self) -> CommandSet {
        let mut set = CommandSet::new();
        set.push_group(
            self.hosts
                .iter()
                .flat_map(Host::membership_commands)
                .collect(),
        );
        for interface in &self.interfaces {
            let mut firewalls = interface.firewalls().iter().collect::<Vec<_>>();
            firewalls.sort_by_key(|f| f.direction());
            for firewall in firewalls {
                set.append(firewall.commands());
            }
        }
        for interface in &self.interfaces {
            set.push_group(interface.commands());
        }
        set.push_group(self.dhcp_commands());
        set
    }

    /// Shared-network settings followed by every host's static mapping.
    /// Empty unless the network configures DHCP or has hosts.
    fn dhcp_commands(&self) -> Vec<String> {
        let d = &self.descriptor;
        let configured = DHCP_SETTINGS.iter().any(|name| d.get(name).is_some());
        if !configured && self.hosts.is_empty() {
            return Vec::new();
        }

        let shared = emit::path(&["service", "dhcp-server", "shared-network-name", &self.name]);
        let mut out = Vec::new();
        if let Some(on) = d.flag("authoritative") {
            out.push(format!("{shared} authoritative {}", emit::enable(on)));
        }
        if let Some(text) = d.text("description") {
            out.push(emit::description(&shared, &text));
        }
        if let Some(cidr) = self.cidr_text() {
            let subnet = format!("{shared} {}", emit::path(&["subnet", &cidr]));
            if let Some(router) = d.text("default-router") {
                out.push(emit::scalar(&subnet, "default-router", &router));
            }
            if let (Some(start), Some(stop)) = (d.text("dhcp-start"), d.text("dhcp-stop")) {
                out.push(format!(
                    "{subnet} start {} stop {}",
                    command_diff_core::quote(&start),
                    command_diff_core::quote(&stop)
                ));
            }
            if let Some(lease) = d.text("lease") {
                out.push(emit::scalar(&subnet, "lease", &lease));
            }
            for server in d.list("dns-servers") {
                out.push(emit::scalar(&subnet, "dns-server", &server));
            }
            if let Some(domain) = d.text("domain-name") {
                out.push(emit::scalar(&subnet, "domain-name", &domain));
            }
        }
        for host in &self.hosts {
            out.extend(host.static_mapping_commands());
        }
        out
    }

    pub fn validate(&mut self) -> bool {
        let owner = self.to_string();
        let mut valid = self.descriptor.validate(&owner);
        for interface in &mut self.interfaces {
            valid &= interface.validate();
        }
        for host in &mut self.hosts {
            valid &= host.validate();
        }
        valid
    }

    pub fn errors(&self) -> Vec<String> {
        let mut out = self.descriptor.errors().to_vec();
        for interface in &self.interfaces {
            out.extend(interface.errors());
        }
        for host in &self.hosts {
            out.extend(host.errors().iter().cloned());
        }
        out
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Network {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Network;
    use crate::attributes::Attributes;
    use crate::model::{Direction, Firewall, Host, Interface, Nat};

    fn yaml(text: &str) -> Attributes {
        serde_yaml::from_str(text).expect("yaml")
    }

    fn lan() -> (Network, Nat) {
        let mut network = Network::new(
            "lan",
            yaml("cidr: 10.0.0.0/24\ndefault-router: 10.0.0.1\ndhcp-start: 10.0.0.100\ndhcp-stop: 10.0.0.199\n"),
        );
        let mut interface = Interface::new("eth1", yaml("address: 10.0.0.1/24\n"));
        interface.attach(Firewall::new("lan-in", Direction::In, yaml("default-action: drop\n")));
        network.add_interface(interface);
        (network, Nat::default())
    }

    #[test]
    fn groups_follow_membership_firewall_interface_dhcp_order() {
        let (mut network, mut nat) = lan();
        let host = Host::new(
            "nas",
            "lan",
            network.cidr_text(),
            yaml("address: 10.0.0.5\nmac: '00:11:22:33:44:55'\naddress-groups: [storage]\nconnections:\n  - {allow: true, source: {address: 10.0.0.5}, destination: {port: 443}}\n"),
        );
        network.add_host(host, &mut nat).expect("add host");

        let set = network.commands();
        assert_eq!(set.groups.len(), 5);
        assert_eq!(
            set.groups[0],
            vec!["firewall group address-group storage address 10.0.0.5"]
        );
        assert_eq!(set.groups[1], vec!["firewall name lan-in default-action drop"]);
        assert_eq!(set.groups[2][0], "firewall name lan-in rule 10 action accept");
        assert_eq!(
            set.groups[3],
            vec![
                "interfaces ethernet eth1 address 10.0.0.1/24",
                "interfaces ethernet eth1 firewall in name lan-in",
            ]
        );
        assert_eq!(
            set.groups[4],
            vec![
                "service dhcp-server shared-network-name lan subnet 10.0.0.0/24 default-router 10.0.0.1",
                "service dhcp-server shared-network-name lan subnet 10.0.0.0/24 start 10.0.0.100 stop 10.0.0.199",
                "service dhcp-server shared-network-name lan subnet 10.0.0.0/24 static-mapping nas ip-address 10.0.0.5",
                "service dhcp-server shared-network-name lan subnet 10.0.0.0/24 static-mapping nas mac-address 00:11:22:33:44:55",
            ]
        );
    }

    #[test]
    fn wan_interface_defaults_to_eth0() {
        let (network, _) = lan();
        assert_eq!(network.wan_interface(), "eth0");
    }

    #[test]
    fn missing_cidr_is_reported() {
        let mut network = Network::new("dmz", Attributes::new());
        assert!(!network.validate());
        assert_eq!(
            network.errors(),
            vec!["Network dmz: missing required attribute 'cidr'"]
        );
    }
}
