use std::fmt::{self, Display, Formatter};

use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::predicates::{self, STATE_FLAGS};

/// Where a rule came from. Used to tell a host's own synthesized rules apart
/// from everything else when checking number collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOrigin {
    /// Read from a rule file.
    Configured,
    /// Synthesized from entry `index` of a host's `connections`.
    Connection { host: String, index: usize },
    /// Synthesized from a host's `forward-ports`.
    ForwardPort { host: String },
    /// Synthesized from a host's `hairpin-ports`.
    Hairpin { host: String },
}

pub const RULE_SCHEMA: Schema = Schema {
    fields: &[
        ("action", predicates::firewall_action),
        ("description", predicates::text),
        ("log", predicates::flag),
        ("protocol", predicates::protocol),
        ("state", predicates::state),
        ("source", predicates::endpoint),
        ("destination", predicates::endpoint),
    ],
    required: &["action"],
};

/// One numbered rule of a [`Firewall`](super::Firewall).
#[derive(Debug, Clone)]
pub struct Rule {
    firewall: String,
    number: u32,
    origin: RuleOrigin,
    descriptor: Descriptor,
}

impl Rule {
    pub fn new(firewall: &str, number: u32, attributes: Attributes, origin: RuleOrigin) -> Self {
        Self {
            firewall: firewall.to_string(),
            number,
            origin,
            descriptor: Descriptor::new(attributes, &RULE_SCHEMA),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn origin(&self) -> &RuleOrigin {
        &self.origin
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn commands(&self) -> Vec<String> {
        let number = self.number.to_string();
        let prefix = emit::path(&["firewall", "name", &self.firewall, "rule", &number]);
        let d = &self.descriptor;
        let mut out = Vec::new();

        if let Some(action) = d.text("action") {
            out.push(emit::scalar(&prefix, "action", &action));
        }
        if let Some(text) = d.text("description") {
            out.push(emit::description(&prefix, &text));
        }
        if let Some(log) = d.flag("log") {
            out.push(format!("{prefix} log {}", emit::enable(log)));
        }
        if let Some(protocol) = d.text("protocol") {
            out.push(emit::scalar(&prefix, "protocol", &protocol));
        }
        if let Some(state) = d.get("state") {
            for flag in STATE_FLAGS {
                if let Some(on) = state.get(flag).and_then(serde_yaml::Value::as_bool) {
                    out.push(format!("{prefix} state {flag} {}", emit::enable(on)));
                }
            }
        }
        for side in ["source", "destination"] {
            if let Some(value) = d.get(side) {
                out.extend(emit::endpoint(&prefix, side, value));
            }
        }
        out
    }

    pub fn validate(&mut self) -> bool {
        let owner = self.to_string();
        self.descriptor.validate(&owner)
    }

    pub fn errors(&self) -> &[String] {
        self.descriptor.errors()
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Rule {}/{}", self.firewall, self.number)
    }
}
