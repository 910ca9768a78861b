use std::fmt::{self, Display, Formatter};
use std::net::IpAddr;
use std::path::Path;

use serde_yaml::Value;

use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::Result;
use crate::loader::{entry_name, load_attributes, DESCRIPTOR};
use crate::predicates;
use crate::synthesis::{Connection, ForwardPort, HairpinPort};

pub const HOST_SCHEMA: Schema = Schema {
    fields: &[
        ("address", predicates::ip_address),
        ("mac", predicates::mac_address),
        ("description", predicates::text),
        ("address-groups", predicates::name_list),
        ("connections", predicates::connections),
        ("forward-ports", predicates::forward_ports),
        ("hairpin-ports", predicates::hairpin_ports),
    ],
    required: &["address", "mac"],
};

/// A statically addressed host and its declarative firewall/NAT policy.
#[derive(Debug, Clone)]
pub struct Host {
    name: String,
    network: String,
    subnet: Option<String>,
    descriptor: Descriptor,
}

impl Host {
    pub fn new(name: &str, network: &str, subnet: Option<String>, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            network: network.to_string(),
            subnet,
            descriptor: Descriptor::new(attributes, &HOST_SCHEMA),
        }
    }

    /// Load `hosts/<name>/config.yaml`.
    pub fn load(dir: &Path, network: &str, subnet: Option<String>) -> Result<Self> {
        let name = entry_name(dir)?;
        Ok(Self::new(
            &name,
            network,
            subnet,
            load_attributes(&dir.join(DESCRIPTOR))?,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn address(&self) -> Option<String> {
        self.descriptor.text("address")
    }

    pub fn mac(&self) -> Option<String> {
        self.descriptor.text("mac")
    }

    pub fn address_groups(&self) -> Vec<String> {
        self.descriptor.list("address-groups")
    }

    /// True when `address` names this host: its own address or one of its groups.
    pub fn is_self(&self, address: &str) -> bool {
        if let Some(own) = self.address() {
            if own == address {
                return true;
            }
            if let (Ok(a), Ok(b)) = (own.parse::<IpAddr>(), address.parse::<IpAddr>()) {
                if a == b {
                    return true;
                }
            }
        }
        self.address_groups().iter().any(|g| g == address)
    }

    pub fn connections(&self) -> Vec<Connection> {
        entries(self.descriptor.get("connections"))
            .iter()
            .enumerate()
            .filter_map(|(index, value)| Connection::from_value(index, value))
            .collect()
    }

    pub fn forward_ports(&self) -> Vec<ForwardPort> {
        entries(self.descriptor.get("forward-ports"))
            .iter()
            .filter_map(ForwardPort::from_value)
            .collect()
    }

    pub fn hairpin_ports(&self) -> Vec<HairpinPort> {
        entries(self.descriptor.get("hairpin-ports"))
            .iter()
            .filter_map(HairpinPort::from_value)
            .collect()
    }

    /// DHCP static mapping for the host.
    pub fn static_mapping_commands(&self) -> Vec<String> {
        let Some(subnet) = &self.subnet else {
            return Vec::new();
        };
        let prefix = emit::path(&[
            "service",
            "dhcp-server",
            "shared-network-name",
            &self.network,
            "subnet",
            subnet,
            "static-mapping",
            &self.name,
        ]);
        let mut out = Vec::new();
        if let Some(address) = self.address() {
            out.push(emit::scalar(&prefix, "ip-address", &address));
        }
        if let Some(mac) = self.mac() {
            out.push(emit::scalar(&prefix, "mac-address", &mac.to_ascii_lowercase()));
        }
        out
    }

    /// One address-group entry per group the host belongs to.
    pub fn membership_commands(&self) -> Vec<String> {
        let Some(address) = self.address() else {
            return Vec::new();
        };
        self.address_groups()
            .iter()
            .map(|group| {
                let prefix = emit::path(&["firewall", "group", "address-group", group]);
                emit::scalar(&prefix, "address", &address)
            })
            .collect()
    }

    pub fn validate(&mut self) -> bool {
        let owner = self.to_string();
        self.descriptor.validate(&owner)
    }

    pub fn errors(&self) -> &[String] {
        self.descriptor.errors()
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Host {}/{}", self.network, self.name)
    }
}

fn entries(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
