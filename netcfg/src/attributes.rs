//! Attribute registry shared by every configuration entity.
//!
//! Each entity keeps the attributes it was declared with in an ordered map and
//! a parallel registry of attribute name -> predicate. Validation walks the
//! declared names, never stops at the first failure, and records one
//! human-readable error per failing attribute.
//!
//! ## Declared attributes
//!
//! The declared list is every key present in the descriptor plus every
//! attribute the entity requires. That way:
//! - an unknown key has no predicate and is reported as unsupported
//! - a missing required key is checked as `null` and reported as missing

use indexmap::IndexMap;
use serde_yaml::Value;

/// Ordered attribute map as read from a descriptor.
pub type Attributes = IndexMap<String, Value>;

/// Accepts or rejects one attribute value.
pub type Predicate = fn(&Value) -> bool;

/// Static description of the attributes an entity understands.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [(&'static str, Predicate)],
    pub required: &'static [&'static str],
}

/// Name -> predicate registry plus accumulated errors.
#[derive(Debug, Clone, Default)]
pub struct AttributeValidator {
    predicates: IndexMap<String, Predicate>,
    declared: Vec<String>,
    errors: Vec<String>,
}

impl AttributeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validator from a schema, declaring `present` and the required names.
    pub fn from_schema<'a>(schema: &Schema, present: impl IntoIterator<Item = &'a String>) -> Self {
        let mut validator = Self::new();
        for (name, predicate) in schema.fields {
            validator.register(name, *predicate);
        }
        validator.declare(present.into_iter().map(String::as_str));
        validator.declare(schema.required.iter().copied());
        validator
    }

    /// Build a validator that accepts any value for each of `names`.
    pub fn permissive<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        let mut validator = Self::new();
        for name in names {
            validator.register(name, crate::predicates::any);
            validator.declare([name.as_str()]);
        }
        validator
    }

    pub fn register(&mut self, name: &str, predicate: Predicate) {
        self.predicates.insert(name.to_string(), predicate);
    }

    /// Add names to the declared list, keeping first-seen order.
    pub fn declare<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if !self.declared.iter().any(|d| d == name) {
                self.declared.push(name.to_string());
            }
        }
    }

    /// Check every declared attribute of `attributes`, recording failures
    /// against `owner`.
    pub fn validate(&mut self, owner: &str, attributes: &Attributes) -> bool {
        let mut valid = true;
        for name in &self.declared {
            let Some(predicate) = self.predicates.get(name) else {
                self.errors
                    .push(format!("{owner}: attribute '{name}' is not supported"));
                valid = false;
                continue;
            };
            match attributes.get(name) {
                Some(value) if predicate(value) => {}
                Some(value) => {
                    self.errors.push(format!(
                        "{owner}: invalid value for attribute '{name}': {}",
                        render_value(value)
                    ));
                    valid = false;
                }
                None if predicate(&Value::Null) => {}
                None => {
                    self.errors
                        .push(format!("{owner}: missing required attribute '{name}'"));
                    valid = false;
                }
            }
        }
        valid
    }

    /// Record a failure found outside the per-attribute predicates.
    pub fn record(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Attributes of one entity together with their validator.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    attributes: Attributes,
    validator: AttributeValidator,
}

impl Descriptor {
    pub fn new(attributes: Attributes, schema: &Schema) -> Self {
        let validator = AttributeValidator::from_schema(schema, attributes.keys());
        Self {
            attributes,
            validator,
        }
    }

    pub fn permissive(attributes: Attributes) -> Self {
        let validator = AttributeValidator::permissive(attributes.keys());
        Self {
            attributes,
            validator,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Scalar attribute rendered as text.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(scalar_text)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn number(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Sequence attribute rendered as text, skipping non-scalar entries.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name).map(scalar_list).unwrap_or_default()
    }

    pub fn validate(&mut self, owner: &str) -> bool {
        self.validator.validate(owner, &self.attributes)
    }

    pub fn record_error(&mut self, error: String) {
        self.validator.record(error);
    }

    pub fn errors(&self) -> &[String] {
        self.validator.errors()
    }
}

/// Render a scalar YAML value as text. Returns `None` for null, sequences and mappings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn scalar_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Look up `key` inside a mapping value and render it as text.
pub fn field_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => scalar_text(other).unwrap_or_else(|| {
            serde_yaml::to_string(other)
                .map(|s| s.trim().replace('\n', " "))
                .unwrap_or_default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::{AttributeValidator, Attributes, Schema};
    use crate::predicates;

    const SCHEMA: Schema = Schema {
        fields: &[
            ("action", predicates::firewall_action),
            ("log", predicates::flag),
        ],
        required: &["action"],
    };

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn accepts_valid_attributes() {
        let a = attrs(&[("action", Value::from("accept")), ("log", Value::from(true))]);
        let mut v = AttributeValidator::from_schema(&SCHEMA, a.keys());
        assert!(v.validate("Rule lan-in/10", &a));
        assert!(v.errors().is_empty());
    }

    #[test]
    fn reports_every_failure_without_short_circuit() {
        let a = attrs(&[
            ("log", Value::from("sometimes")),
            ("colour", Value::from("blue")),
        ]);
        let mut v = AttributeValidator::from_schema(&SCHEMA, a.keys());
        assert!(!v.validate("Rule lan-in/10", &a));
        assert_eq!(
            v.errors(),
            [
                "Rule lan-in/10: invalid value for attribute 'log': sometimes",
                "Rule lan-in/10: attribute 'colour' is not supported",
                "Rule lan-in/10: missing required attribute 'action'",
            ]
        );
    }

    #[test]
    fn errors_accumulate_across_calls() {
        let a = attrs(&[]);
        let mut v = AttributeValidator::from_schema(&SCHEMA, a.keys());
        assert!(!v.validate("Rule x", &a));
        assert!(!v.validate("Rule x", &a));
        assert_eq!(v.errors().len(), 2);
    }

    #[test]
    fn permissive_accepts_anything_declared() {
        let a = attrs(&[("system/host-name", Value::from("r1"))]);
        let mut v = AttributeValidator::permissive(a.keys());
        assert!(v.validate("GlobalSettings", &a));
    }
}
