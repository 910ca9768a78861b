use std::fmt::{self, Display, Formatter};
use std::path::Path;

use tracing::debug;

use super::firewall::{next_free, DEFAULT_AUTO_INCREMENT};
use super::rule::RuleOrigin;
use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::{ConfigError, Result};
use crate::loader::{list_rule_files, load_attributes, DESCRIPTOR};
use crate::predicates::{self, RULE_NUMBER_MAX};

pub const NAT_SCHEMA: Schema = Schema {
    fields: &[("auto-increment", predicates::rule_number)],
    required: &[],
};

pub const NAT_RULE_SCHEMA: Schema = Schema {
    fields: &[
        ("type", predicates::nat_type),
        ("description", predicates::text),
        ("log", predicates::flag),
        ("protocol", predicates::protocol),
        ("inbound-interface", predicates::interface_name),
        ("outbound-interface", predicates::interface_name),
        ("source", predicates::endpoint),
        ("destination", predicates::endpoint),
        ("inside-address", predicates::endpoint),
    ],
    required: &["type"],
};

/// One numbered NAT rule.
#[derive(Debug, Clone)]
pub struct NatRule {
    number: u32,
    origin: RuleOrigin,
    descriptor: Descriptor,
}

impl NatRule {
    pub fn new(number: u32, attributes: Attributes, origin: RuleOrigin) -> Self {
        Self {
            number,
            origin,
            descriptor: Descriptor::new(attributes, &NAT_RULE_SCHEMA),
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
        let prefix = format!("service nat rule {}", self.number);
        let d = &self.descriptor;
        let mut out = Vec::new();

        if let Some(text) = d.text("description") {
            out.push(emit::description(&prefix, &text));
        }
        if let Some(log) = d.flag("log") {
            out.push(format!("{prefix} log {}", emit::enable(log)));
        }
        for name in ["protocol", "type", "inbound-interface", "outbound-interface"] {
            if let Some(value) = d.text(name) {
                out.push(emit::scalar(&prefix, name, &value));
            }
        }
        for side in ["source", "destination", "inside-address"] {
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

impl Display for NatRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "NATRule {}", self.number)
    }
}

/// The device-wide NAT rule set, shared by every network of a tree.
#[derive(Debug, Clone)]
pub struct Nat {
    auto_increment: u32,
    descriptor: Descriptor,
    rules: Vec<NatRule>,
}

impl Default for Nat {
    fn default() -> Self {
        Self::new(Attributes::new())
    }
}

impl Nat {
    pub fn new(attributes: Attributes) -> Self {
        let descriptor = Descriptor::new(attributes, &NAT_SCHEMA);
        let auto_increment = descriptor
            .number("auto-increment")
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (1..=RULE_NUMBER_MAX).contains(n))
            .unwrap_or(DEFAULT_AUTO_INCREMENT);
        Self {
            auto_increment,
            descriptor,
            rules: Vec::new(),
        }
    }

    /// Load `nat/config.yaml` and its numbered rule files. A missing
    /// directory yields an empty NAT.
    pub fn load(dir: &Path) -> Result<Self> {
        let base = dir.join(DESCRIPTOR);
        let attributes = if base.is_file() {
            load_attributes(&base)?
        } else {
            Attributes::new()
        };
        let mut nat = Self::new(attributes);
        for (number, path) in list_rule_files(dir)? {
            nat.register_rule(Some(number), load_attributes(&path)?, RuleOrigin::Configured)?;
        }
        debug!(rules = nat.rules.len(), "loaded nat");
        Ok(nat)
    }

    pub fn auto_increment(&self) -> u32 {
        self.auto_increment
    }

    pub fn rules(&self) -> &[NatRule] {
        &self.rules
    }

    pub fn next_number(&self) -> Option<u32> {
        next_free(self.auto_increment, self.rules.iter().map(NatRule::number))
    }

    /// Add a rule, allocating a number when none is given. Returns the number used.
    pub fn register_rule(
        &mut self,
        number: Option<u32>,
        attributes: Attributes,
        origin: RuleOrigin,
    ) -> Result<u32> {
        let number = match number {
            Some(number) => number,
            None => self
                .next_number()
                .ok_or_else(|| ConfigError::RuleNumbersExhausted {
                    owner: "NAT".to_string(),
                })?,
        };
        self.rules.push(NatRule::new(number, attributes, origin));
        Ok(number)
    }

    /// Every rule's commands, in rule-number order.
    pub fn commands(&self) -> Vec<String> {
        let mut rules = self.rules.iter().collect::<Vec<_>>();
        rules.sort_by_key(|r| r.number());
        rules.into_iter().flat_map(NatRule::commands).collect()
    }

    pub fn validate(&mut self) -> bool {
        let mut valid = self.descriptor.validate("NAT");
        for rule in &mut self.rules {
            valid &= rule.validate();
        }
        valid
    }

    pub fn errors(&self) -> Vec<String> {
        let mut out = self.descriptor.errors().to_vec();
        for rule in &self.rules {
            out.extend(rule.errors().iter().cloned());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::{Nat, NatRule};
    use crate::loader::attributes_from;
    use crate::model::rule::RuleOrigin;

    fn attrs(yaml: &str) -> crate::attributes::Attributes {
        attributes_from(serde_yaml::from_str(yaml).expect("yaml"), Path::new("t.yaml"))
            .expect("attrs")
    }

    #[test]
    fn nat_rule_emits_in_contract_order() {
        let rule = NatRule::new(
            5000,
            attrs(
                r#"
inside-address: {address: 10.0.10.5, port: 22}
destination: {port: 8022}
source: {address: external-addresses}
outbound-interface: eth1
inbound-interface: eth0
type: destination
protocol: tcp_udp
log: false
description: ssh
"#,
            ),
            RuleOrigin::Configured,
        );
        assert_eq!(
            rule.commands(),
            vec![
                r#"service nat rule 5000 description "ssh""#,
                "service nat rule 5000 log disable",
                "service nat rule 5000 protocol tcp_udp",
                "service nat rule 5000 type destination",
                "service nat rule 5000 inbound-interface eth0",
                "service nat rule 5000 outbound-interface eth1",
                "service nat rule 5000 source group address-group external-addresses",
                "service nat rule 5000 destination port 8022",
                "service nat rule 5000 inside-address address 10.0.10.5",
                "service nat rule 5000 inside-address port 22",
            ]
        );
    }

    #[test]
    fn nat_commands_follow_rule_numbers() {
        let mut nat = Nat::new(attrs("{auto-increment: 100}"));
        nat.register_rule(Some(300), attrs("{type: masquerade}"), RuleOrigin::Configured)
            .expect("register");
        let allocated = nat.register_rule(None, attrs("{type: source}"), RuleOrigin::Configured)
            .expect("register");
        assert_eq!(allocated, 100);
        assert_eq!(
            nat.commands(),
            vec![
                "service nat rule 100 type source",
                "service nat rule 300 type masquerade",
            ]
        );
    }

    #[test]
    fn oversized_auto_increment_falls_back_and_is_reported() {
        let mut nat = Nat::new(attrs("{auto-increment: 3000000000}"));
        assert_eq!(nat.auto_increment(), 10);
        let first = nat
            .register_rule(None, attrs("{type: source}"), RuleOrigin::Configured)
            .expect("first");
        let second = nat
            .register_rule(None, attrs("{type: source}"), RuleOrigin::Configured)
            .expect("second");
        assert_eq!((first, second), (10, 20));

        assert!(!nat.validate());
        assert_eq!(
            nat.errors(),
            vec!["NAT: invalid value for attribute 'auto-increment': 3000000000"]
        );
    }
}
