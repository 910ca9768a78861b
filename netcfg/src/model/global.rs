use command_diff_core::{quote, Command};
use serde_yaml::Value;

use crate::attributes::{scalar_text, Attributes, Descriptor};

/// Free-form device settings keyed by slash-delimited paths.
///
/// Any key is accepted. Nested mappings are flattened into the path, so
/// `system/host-name: r1` and `system: {host-name: r1}` emit the same command.
#[derive(Debug, Clone, Default)]
pub struct GlobalSettings {
    descriptor: Descriptor,
}

impl GlobalSettings {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            descriptor: Descriptor::permissive(attributes),
        }
    }

    /// One command per key in declaration order; list values emit one command per item.
    pub fn commands(&self) -> Vec<String> {
        self.descriptor
            .attributes()
            .iter()
            .flat_map(|(key, value)| setting_commands(key, value))
            .collect()
    }

    /// Any key is accepted, but each must yield commands with both a key and
    /// a value.
    pub fn validate(&mut self) -> bool {
        let mut valid = self.descriptor.validate(OWNER);
        let incomplete = self
            .descriptor
            .attributes()
            .iter()
            .filter(|(key, value)| {
                setting_commands(key, value)
                    .iter()
                    .any(|line| Command::parse(line).is_err())
            })
            .map(|(key, _)| key.to_string())
            .collect::<Vec<_>>();
        for key in incomplete {
            self.descriptor
                .record_error(format!("{OWNER}: setting '{key}' has no value"));
            valid = false;
        }
        valid
    }

    pub fn errors(&self) -> &[String] {
        self.descriptor.errors()
    }
}

const OWNER: &str = "GlobalSettings";

fn setting_commands(key: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    flatten(&key_path(key), value, &mut out);
    out
}

/// Slash-delimited key as space-separated, shell-safe words.
fn key_path(key: &str) -> String {
    key.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| quote(s).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn flatten(path: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => out.push(path.to_string()),
        Value::Sequence(items) => {
            for item in items {
                flatten(path, item, out);
            }
        }
        Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(k) = scalar_text(k) {
                    flatten(&format!("{path} {}", key_path(&k)), v, out);
                }
            }
        }
        Value::Tagged(tagged) => flatten(path, &tagged.value, out),
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.push(format!("{path} {}", quote(&text)));
            }
        }
    }
}
