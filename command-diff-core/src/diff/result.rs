use std::collections::BTreeMap;

use serde::Serialize;

/// Key/value classification of two command snapshots.
///
/// Every map is keyed by command key. `added`, `changed` and `preserved`
/// hold the current value; `removed` holds the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigDifference {
    /// Key only present in the current snapshot.
    pub added: BTreeMap<String, String>,
    /// Key only present in the previous snapshot.
    pub removed: BTreeMap<String, String>,
    /// Key present in both with a different value.
    pub changed: BTreeMap<String, String>,
    /// Key present in both with the same value.
    pub preserved: BTreeMap<String, String>,
}

impl ConfigDifference {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when applying the current snapshot would change nothing.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// True when `key` has to be (re)applied from the current snapshot.
    pub fn needs_apply(&self, key: &str) -> bool {
        self.added.contains_key(key) || self.changed.contains_key(key)
    }
}
