use std::fmt::{self, Display, Formatter};
use std::path::Path;

use super::firewall::{Direction, Firewall};
use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::Result;
use crate::loader::{entry_name, list_configured_subdirectories, load_attributes, DESCRIPTOR};
use crate::predicates;

pub const INTERFACE_SCHEMA: Schema = Schema {
    fields: &[
        ("description", predicates::text),
        ("address", predicates::interface_address),
        ("mtu", predicates::mtu),
    ],
    required: &[],
};

/// A device interface (or VLAN sub-interface) and the firewalls attached to it.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    descriptor: Descriptor,
    firewalls: Vec<Firewall>,
}

impl Interface {
    pub fn new(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::new(attributes, &INTERFACE_SCHEMA),
            firewalls: Vec::new(),
        }
    }

    /// Load `interfaces/<name>/config.yaml` and `firewalls/<direction>/`.
    pub fn load(dir: &Path, network: &str) -> Result<Self> {
        let name = entry_name(dir)?;
        let mut interface = Self::new(&name, load_attributes(&dir.join(DESCRIPTOR))?);
        for fw_dir in list_configured_subdirectories(&[dir.join("firewalls")])? {
            let direction = entry_name(&fw_dir)?.to_ascii_lowercase();
            let default_name = format!("{network}-{direction}");
            interface.attach(Firewall::load(&fw_dir, &default_name)?);
        }
        Ok(interface)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attach(&mut self, firewall: Firewall) {
        self.firewalls.push(firewall);
    }

    pub fn firewalls(&self) -> &[Firewall] {
        &self.firewalls
    }

    pub fn firewall(&self, direction: Direction) -> Option<&Firewall> {
        self.firewalls.iter().find(|f| f.direction() == direction)
    }

    pub fn firewall_mut(&mut self, direction: Direction) -> Option<&mut Firewall> {
        self.firewalls
            .iter_mut()
            .find(|f| f.direction() == direction)
    }

    /// `interfaces <kind> <name> [vif <id>]` for this interface.
    pub fn config_path(&self) -> String {
        let (base, vif) = match self.name.split_once('.') {
            Some((base, vif)) => (base, Some(vif)),
            None => (self.name.as_str(), None),
        };
        let kind = interface_kind(base);
        match vif {
            Some(vif) => emit::path(&["interfaces", kind, base, "vif", vif]),
            None => emit::path(&["interfaces", kind, base]),
        }
    }

    /// Interface settings followed by one binding per attached firewall.
    pub fn commands(&self) -> Vec<String> {
        let prefix = self.config_path();
        let mut out = Vec::new();
        if let Some(text) = self.descriptor.text("description") {
            out.push(emit::description(&prefix, &text));
        }
        for name in ["address", "mtu"] {
            if let Some(value) = self.descriptor.text(name) {
                out.push(emit::scalar(&prefix, name, &value));
            }
        }
        let mut firewalls = self.firewalls.iter().collect::<Vec<_>>();
        firewalls.sort_by_key(|f| f.direction());
        for firewall in firewalls {
            out.push(format!(
                "{prefix} {}",
                emit::path(&["firewall", firewall.direction().as_str(), "name", firewall.name()])
            ));
        }
        out
    }

    pub fn validate(&mut self) -> bool {
        let owner = self.to_string();
        let mut valid = self.descriptor.validate(&owner);
        for firewall in &mut self.firewalls {
            valid &= firewall.validate();
        }
        valid
    }

    pub fn errors(&self) -> Vec<String> {
        let mut out = self.descriptor.errors().to_vec();
        for firewall in &self.firewalls {
            out.extend(firewall.errors());
        }
        out
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Interface {}", self.name)
    }
}

fn interface_kind(base: &str) -> &'static str {
    if base.starts_with("switch") {
        "switch"
    } else if base.starts_with("br") {
        "bridge"
    } else if base.starts_with("wg") {
        "wireguard"
    } else if base.starts_with("vtun") {
        "openvpn"
    } else if base.starts_with("pppoe") {
        "pppoe"
    } else {
        "ethernet"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    use super::Interface;
    use crate::attributes::Attributes;
    use crate::model::firewall::{Direction, Firewall};

    #[test]
    fn config_path_handles_kinds_and_vifs() {
        let path = |name: &str| Interface::new(name, Attributes::new()).config_path();
        assert_eq!(path("eth1"), "interfaces ethernet eth1");
        assert_eq!(path("eth1.20"), "interfaces ethernet eth1 vif 20");
        assert_eq!(path("switch0"), "interfaces switch switch0");
        assert_eq!(path("br0"), "interfaces bridge br0");
    }

    #[test]
    fn commands_bind_firewalls_in_direction_order() {
        let mut attrs = Attributes::new();
        attrs.insert("description".to_string(), Value::from("LAN"));
        attrs.insert("address".to_string(), Value::from("10.0.10.1/24"));
        let mut iface = Interface::new("eth1", attrs);
        iface.attach(Firewall::new("lan-local", Direction::Local, Attributes::new()));
        iface.attach(Firewall::new("lan-in", Direction::In, Attributes::new()));

        assert_eq!(
            iface.commands(),
            vec![
                r#"interfaces ethernet eth1 description "LAN""#,
                "interfaces ethernet eth1 address 10.0.10.1/24",
                "interfaces ethernet eth1 firewall in name lan-in",
                "interfaces ethernet eth1 firewall local name lan-local",
            ]
        );
    }
}
