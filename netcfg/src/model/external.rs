use std::path::Path;

use serde_yaml::Value;

use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::{ConfigError, Result};
use crate::loader::{attributes_from, load_structured};
use crate::predicates;

/// Address group every external address is collected into.
pub const EXTERNAL_GROUP: &str = "external-addresses";

const DEFAULT_DESCRIPTION: &str = "External addresses";

pub const EXTERNAL_SCHEMA: Schema = Schema {
    fields: &[
        ("description", predicates::text),
        ("addresses", predicates::address_list),
    ],
    required: &["addresses"],
};

/// The device's public addresses, published as one address group.
#[derive(Debug, Clone)]
pub struct ExternalAddresses {
    descriptor: Descriptor,
}

impl Default for ExternalAddresses {
    fn default() -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("addresses".to_string(), Value::Sequence(Vec::new()));
        Self::new(attributes)
    }
}

impl ExternalAddresses {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            descriptor: Descriptor::new(attributes, &EXTERNAL_SCHEMA),
        }
    }

    /// Load a bare address list or a `{description, addresses}` mapping.
    /// A missing file yields an empty group.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        match load_structured(path)? {
            Value::Sequence(items) => {
                let mut attributes = Attributes::new();
                attributes.insert("addresses".to_string(), Value::Sequence(items));
                Ok(Self::new(attributes))
            }
            Value::Null => Ok(Self::default()),
            value @ Value::Mapping(_) => Ok(Self::new(attributes_from(value, path)?)),
            _ => Err(ConfigError::malformed(
                path,
                "expected a list of addresses or a mapping",
            )),
        }
    }

    pub fn addresses(&self) -> Vec<String> {
        self.descriptor.list("addresses")
    }

    /// Description first, then one address command per entry in input order.
    pub fn commands(&self) -> Vec<String> {
        let prefix = format!("firewall group address-group {EXTERNAL_GROUP}");
        let description = self
            .descriptor
            .text("description")
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let mut out = vec![emit::description(&prefix, &description)];
        for address in self.addresses() {
            out.push(emit::scalar(&prefix, "address", &address));
        }
        out
    }

    pub fn validate(&mut self) -> bool {
        self.descriptor.validate("ExternalAddresses")
    }

    pub fn errors(&self) -> &[String] {
        self.descriptor.errors()
    }
}
