use std::fmt::{self, Display, Formatter};
use std::path::Path;

use serde_yaml::Value;

use crate::attributes::{Attributes, Descriptor, Schema};
use crate::emit;
use crate::error::{ConfigError, Result};
use crate::loader::{attributes_from, list_descriptor_files, load_structured};
use crate::predicates;

pub const PORT_GROUP_SCHEMA: Schema = Schema {
    fields: &[
        ("description", predicates::text),
        ("ports", predicates::port_list),
    ],
    required: &["ports"],
};

/// A named list of ports, published as a firewall port group.
#[derive(Debug, Clone)]
pub struct PortGroup {
    name: String,
    descriptor: Descriptor,
}

impl PortGroup {
    pub fn new(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            descriptor: Descriptor::new(attributes, &PORT_GROUP_SCHEMA),
        }
    }

    /// Load `port-groups/<name>.yaml`: a bare port list or `{description, ports}`.
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::malformed(path, "port group file has no name"))?
            .to_string();
        let attributes = match load_structured(path)? {
            Value::Sequence(items) => {
                let mut attributes = Attributes::new();
                attributes.insert("ports".to_string(), Value::Sequence(items));
                attributes
            }
            value @ (Value::Mapping(_) | Value::Null) => attributes_from(value, path)?,
            _ => {
                return Err(ConfigError::malformed(
                    path,
                    "expected a list of ports or a mapping",
                ))
            }
        };
        Ok(Self::new(&name, attributes))
    }

    /// Every port group under `dir`, sorted by file name.
    pub fn load_all(dir: &Path) -> Result<Vec<Self>> {
        list_descriptor_files(&[dir.to_path_buf()])?
            .iter()
            .map(|path| Self::load(path))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> Vec<String> {
        self.descriptor.list("ports")
    }

    /// One port command per port, then the description if present.
    pub fn commands(&self) -> Vec<String> {
        let prefix = emit::path(&["firewall", "group", "port-group", &self.name]);
        let mut out = self
            .ports()
            .iter()
            .map(|port| emit::scalar(&prefix, "port", port))
            .collect::<Vec<_>>();
        if let Some(text) = self.descriptor.text("description") {
            out.push(emit::description(&prefix, &text));
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

impl Display for PortGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PortGroup {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::PortGroup;

    #[test]
    fn loads_bare_lists_and_mappings() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("web.yaml"), "[80, 443]").expect("write");
        fs::write(
            dir.path().join("dns.yaml"),
            "description: Name service\nports: [53]\n",
        )
        .expect("write");

        let groups = PortGroup::load_all(dir.path()).expect("load");
        assert_eq!(
            groups.iter().map(PortGroup::name).collect::<Vec<_>>(),
            vec!["dns", "web"]
        );
        assert_eq!(
            groups[0].commands(),
            vec![
                "firewall group port-group dns port 53",
                "firewall group port-group dns description 'Name service'",
            ]
        );
        assert_eq!(
            groups[1].commands(),
            vec![
                "firewall group port-group web port 80",
                "firewall group port-group web port 443",
            ]
        );
    }
}
