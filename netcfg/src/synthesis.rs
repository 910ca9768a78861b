//! Policy synthesis: turns a host's declarative policy into firewall rules
//! and NAT rules.
//!
//! A host never owns the rules it produces. During network construction the
//! host is handed a [`NetworkContext`], a short-lived view of its network's
//! interfaces and of the shared NAT, and every synthesized rule is added with
//! an explicit `register_rule` call on the owning firewall or NAT.
//!
//! # Mapping
//!
//! - `connections`: one firewall rule per entry. The entry's source naming
//!   the host (its address or one of its address groups) selects the `in`
//!   firewall, anything else selects `out`.
//! - `forward-ports`: one destination NAT rule per entry on the WAN interface.
//!   A bare port or port group keeps the port, `{external: internal}`
//!   translates it.
//! - `hairpin-ports`: one destination NAT rule per entry with no source, so
//!   inside clients reaching the external address are sent to the host.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::attributes::{field_text, scalar_text, Attributes};
use crate::error::{ConfigError, Result};
use crate::model::{Direction, Firewall, Host, Interface, Nat, RuleOrigin};

const DEFAULT_PROTOCOL: &str = "tcp_udp";

/// One side of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub address: Option<String>,
    pub port: Option<String>,
}

impl Endpoint {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(v) => Self {
                address: field_text(v, "address"),
                port: field_text(v, "port"),
            },
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.port.is_none()
    }

    fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        if let Some(address) = &self.address {
            map.insert("address".into(), address.as_str().into());
        }
        if let Some(port) = &self.port {
            map.insert("port".into(), port.as_str().into());
        }
        Value::Mapping(map)
    }
}

/// A typed `connections` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Position in the host's `connections` list.
    pub index: usize,
    pub allow: bool,
    pub rule: Option<u32>,
    pub description: Option<String>,
    pub log: bool,
    pub protocol: String,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub state: Option<Value>,
}

impl Connection {
    /// Parse entry `index`. Non-mapping entries are skipped; validation
    /// reports them.
    pub fn from_value(index: usize, value: &Value) -> Option<Self> {
        value.as_mapping()?;
        Some(Self {
            index,
            allow: value.get("allow").and_then(Value::as_bool).unwrap_or(false),
            rule: value
                .get("rule")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
            description: field_text(value, "description"),
            log: value.get("log").and_then(Value::as_bool).unwrap_or(false),
            protocol: field_text(value, "protocol").unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            source: Endpoint::from_value(value.get("source")),
            destination: Endpoint::from_value(value.get("destination")),
            state: value.get("state").filter(|v| !v.is_null()).cloned(),
        })
    }

    /// `in` when the host is the source, otherwise `out`.
    pub fn direction(&self, host: &Host) -> Direction {
        if self.source.address.as_deref().is_some_and(|a| host.is_self(a)) {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// True when either side names the host.
    pub fn involves(&self, host: &Host) -> bool {
        [&self.source, &self.destination]
            .iter()
            .any(|side| side.address.as_deref().is_some_and(|a| host.is_self(a)))
    }

    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        let action = if self.allow { "accept" } else { "drop" };
        attrs.insert("action".into(), action.into());
        if let Some(text) = &self.description {
            attrs.insert("description".into(), text.as_str().into());
        }
        attrs.insert("log".into(), self.log.into());
        attrs.insert("protocol".into(), self.protocol.as_str().into());
        if let Some(state) = &self.state {
            attrs.insert("state".into(), state.clone());
        }
        if !self.source.is_empty() {
            attrs.insert("source".into(), self.source.to_value());
        }
        if !self.destination.is_empty() {
            attrs.insert("destination".into(), self.destination.to_value());
        }
        attrs
    }
}

/// A typed `forward-ports` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardPort {
    /// Port, port range or port group forwarded unchanged.
    Port(String),
    /// `{external: internal}`.
    Translated { external: String, internal: String },
}

impl ForwardPort {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Mapping(map) => {
                let (external, internal) = map.iter().next()?;
                Some(Self::Translated {
                    external: scalar_text(external)?,
                    internal: scalar_text(internal)?,
                })
            }
            other => scalar_text(other).map(Self::Port),
        }
    }

    /// Port as seen from outside.
    pub fn external(&self) -> &str {
        match self {
            Self::Port(port) => port,
            Self::Translated { external, .. } => external,
        }
    }

    pub fn attributes(&self, host: &Host, wan_interface: &str) -> Attributes {
        let address = host.address().unwrap_or_default();
        let (description, inside) = match self {
            Self::Port(port) => (
                format!("forward port {port} to {}", host.name()),
                Endpoint {
                    address: Some(address),
                    port: None,
                },
            ),
            Self::Translated { external, internal } => (
                format!("forward port {external} to {} port {internal}", host.name()),
                Endpoint {
                    address: Some(address),
                    port: Some(internal.clone()),
                },
            ),
        };
        let destination = Endpoint {
            address: None,
            port: Some(self.external().to_string()),
        };

        let mut attrs = Attributes::new();
        attrs.insert("type".into(), "destination".into());
        attrs.insert("description".into(), description.into());
        attrs.insert("protocol".into(), DEFAULT_PROTOCOL.into());
        attrs.insert("inbound-interface".into(), wan_interface.into());
        attrs.insert("destination".into(), destination.to_value());
        attrs.insert("inside-address".into(), inside.to_value());
        attrs
    }
}

/// A typed `hairpin-ports` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HairpinPort {
    pub destination: Endpoint,
    pub description: Option<String>,
    pub interface: Option<String>,
    pub rule: Option<u32>,
}

impl HairpinPort {
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_mapping()?;
        Some(Self {
            destination: Endpoint::from_value(value.get("connection").and_then(|c| c.get("destination"))),
            description: field_text(value, "description"),
            interface: field_text(value, "interface"),
            rule: value
                .get("rule")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok()),
        })
    }

    pub fn attributes(&self, host: &Host, default_interface: Option<&str>) -> Attributes {
        let description = self.description.clone().unwrap_or_else(|| match &self.destination.port {
            Some(port) => format!("hairpin port {port} to {}", host.name()),
            None => format!("hairpin to {}", host.name()),
        });
        let inside = Endpoint {
            address: host.address(),
            port: None,
        };

        let mut attrs = Attributes::new();
        attrs.insert("type".into(), "destination".into());
        attrs.insert("description".into(), description.into());
        attrs.insert("protocol".into(), DEFAULT_PROTOCOL.into());
        if let Some(interface) = self.interface.as_deref().or(default_interface) {
            attrs.insert("inbound-interface".into(), interface.into());
        }
        attrs.insert("destination".into(), self.destination.to_value());
        attrs.insert("inside-address".into(), inside.to_value());
        attrs
    }
}

/// Non-owning view of a network handed to synthesis.
pub struct NetworkContext<'a> {
    pub network: String,
    pub wan_interface: String,
    pub primary_interface: Option<String>,
    pub interfaces: &'a mut [Interface],
    pub nat: &'a mut Nat,
}

impl NetworkContext<'_> {
    /// First interface firewall attached in `direction`.
    pub fn firewall_mut(&mut self, direction: Direction) -> Option<&mut Firewall> {
        self.interfaces
            .iter_mut()
            .find_map(|interface| interface.firewall_mut(direction))
    }
}

/// Register every rule implied by `host`'s policy.
pub fn synthesize(host: &Host, ctx: &mut NetworkContext<'_>) -> Result<()> {
    for connection in host.connections() {
        let direction = connection.direction(host);
        let network = ctx.network.clone();
        let firewall = ctx
            .firewall_mut(direction)
            .ok_or_else(|| ConfigError::MissingFirewall {
                network,
                host: host.name().to_string(),
                direction: direction.to_string(),
            })?;
        let number = firewall.register_rule(
            connection.rule,
            connection.attributes(),
            RuleOrigin::Connection {
                host: host.name().to_string(),
                index: connection.index,
            },
        )?;
        debug!(host = host.name(), firewall = firewall.name(), number, "synthesized connection rule");
    }

    for forward in host.forward_ports() {
        let number = ctx.nat.register_rule(
            None,
            forward.attributes(host, &ctx.wan_interface),
            RuleOrigin::ForwardPort {
                host: host.name().to_string(),
            },
        )?;
        debug!(host = host.name(), number, port = forward.external(), "synthesized port forward");
    }

    for hairpin in host.hairpin_ports() {
        let number = ctx.nat.register_rule(
            hairpin.rule,
            hairpin.attributes(host, ctx.primary_interface.as_deref()),
            RuleOrigin::Hairpin {
                host: host.name().to_string(),
            },
        )?;
        debug!(host = host.name(), number, "synthesized hairpin rule");
    }
    Ok(())
}
