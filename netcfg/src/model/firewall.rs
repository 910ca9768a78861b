use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use command_diff_core::CommandSet;
use tracing::debug;

use super::rule::{Rule, RuleOrigin};
use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::{ConfigError, Result};
use crate::loader::{list_rule_files, load_attributes, DESCRIPTOR};
use crate::predicates::{self, RULE_NUMBER_MAX};

pub const DEFAULT_AUTO_INCREMENT: u32 = 10;

pub const FIREWALL_SCHEMA: Schema = Schema {
    fields: &[
        ("name", predicates::interface_name),
        ("default-action", predicates::firewall_action),
        ("description", predicates::text),
        ("auto-increment", predicates::rule_number),
        ("enable-default-log", predicates::flag),
    ],
    required: &[],
};

/// Attachment direction of a firewall on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    In,
    Out,
    Local,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Local => "local",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "local" => Ok(Direction::Local),
            other => Err(format!(
                "unknown firewall direction '{other}' (expected in, out or local)"
            )),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named rule set attached to one interface in one direction.
#[derive(Debug, Clone)]
pub struct Firewall {
    name: String,
    direction: Direction,
    auto_increment: u32,
    descriptor: Descriptor,
    rules: Vec<Rule>,
}

impl Firewall {
    /// Create an empty firewall. `default_name` is used unless the
    /// attributes carry an explicit `name`.
    pub fn new(default_name: &str, direction: Direction, attributes: Attributes) -> Self {
        let descriptor = Descriptor::new(attributes, &FIREWALL_SCHEMA);
        let name = descriptor
            .text("name")
            .unwrap_or_else(|| default_name.to_string());
        let auto_increment = descriptor
            .number("auto-increment")
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (1..=RULE_NUMBER_MAX).contains(n))
            .unwrap_or(DEFAULT_AUTO_INCREMENT);
        Self {
            name,
            direction,
            auto_increment,
            descriptor,
            rules: Vec::new(),
        }
    }

    /// Load `<dir>/config.yaml` and every `<number>.yaml` rule file.
    pub fn load(dir: &Path, default_name: &str) -> Result<Self> {
        let direction_name = crate::loader::entry_name(dir)?;
        let direction = direction_name
            .parse::<Direction>()
            .map_err(|reason| ConfigError::malformed(dir, reason))?;
        let mut firewall = Self::new(default_name, direction, load_attributes(&dir.join(DESCRIPTOR))?);
        for (number, path) in list_rule_files(dir)? {
            let attributes = load_attributes(&path)?;
            firewall.register_rule(Some(number), attributes, RuleOrigin::Configured)?;
        }
        debug!(firewall = %firewall.name, rules = firewall.rules.len(), "loaded firewall");
        Ok(firewall)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn auto_increment(&self) -> u32 {
        self.auto_increment
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Smallest multiple of the auto-increment step not used by any rule, or
    /// `None` once every multiple up to [`RULE_NUMBER_MAX`] is taken.
    pub fn next_number(&self) -> Option<u32> {
        next_free(self.auto_increment, self.rules.iter().map(Rule::number))
    }

    /// Add a rule, allocating a number when none is given. Returns the number used.
    ///
    /// An explicit number that is already taken is kept as-is; the consistency
    /// checker reports the collision.
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
                    owner: self.to_string(),
                })?,
        };
        self.rules
            .push(Rule::new(&self.name, number, attributes, origin));
        Ok(number)
    }

    /// Attribute commands as one group, then one group per rule by ascending number.
    pub fn commands(&self) -> CommandSet {
        let prefix = emit::path(&["firewall", "name", &self.name]);
        let mut own = Vec::new();
        if let Some(action) = self.descriptor.text("default-action") {
            own.push(emit::scalar(&prefix, "default-action", &action));
        }
        if let Some(text) = self.descriptor.text("description") {
            own.push(emit::description(&prefix, &text));
        }
        if self.descriptor.flag("enable-default-log") == Some(true) {
            own.push(format!("{prefix} enable-default-log"));
        }

        let mut set = CommandSet::new();
        set.push_group(own);
        let mut rules = self.rules.iter().collect::<Vec<_>>();
        rules.sort_by_key(|r| r.number());
        for rule in rules {
            set.push_group(rule.commands());
        }
        set
    }

    pub fn validate(&mut self) -> bool {
        let owner = self.to_string();
        let mut valid = self.descriptor.validate(&owner);
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

impl Display for Firewall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Firewall {} ({})", self.name, self.direction)
    }
}

/// Walk multiples of `step` until one is not in `used`.
pub(crate) fn next_free(step: u32, used: impl Iterator<Item = u32>) -> Option<u32> {
    let used = used.collect::<std::collections::BTreeSet<_>>();
    let step = step.max(1);
    let mut candidate = step;
    while used.contains(&candidate) {
        candidate = candidate.checked_add(step)?;
    }
    (candidate <= RULE_NUMBER_MAX).then_some(candidate)
}
