use std::collections::{BTreeMap, BTreeSet};

use crate::command::{Command, CommandError};
use crate::diff::result::ConfigDifference;

/// Classify a single key given its value in each snapshot.
///
/// A key with no value on either side is ignored.
pub fn compare_commands(
    difference: &mut ConfigDifference,
    key: &str,
    current: Option<&str>,
    previous: Option<&str>,
) {
    match (current, previous) {
        (Some(cur), None) => {
            difference.added.insert(key.to_string(), cur.to_string());
        }
        (None, Some(prev)) => {
            difference.removed.insert(key.to_string(), prev.to_string());
        }
        (Some(cur), Some(prev)) if cur == prev => {
            difference.preserved.insert(key.to_string(), cur.to_string());
        }
        (Some(cur), Some(_)) => {
            difference.changed.insert(key.to_string(), cur.to_string());
        }
        (None, None) => {}
    }
}

/// Decompose commands into a key -> value map. Later duplicates win.
pub fn keyed<S: AsRef<str>>(commands: &[S]) -> Result<BTreeMap<String, String>, CommandError> {
    let mut out = BTreeMap::new();
    for line in commands {
        let command = Command::parse(line.as_ref())?;
        out.insert(command.key, command.value);
    }
    Ok(out)
}

/// Diff two flat command lists.
pub fn diff_configurations<S: AsRef<str>, P: AsRef<str>>(
    current: &[S],
    previous: &[P],
) -> Result<ConfigDifference, CommandError> {
    let current = keyed(current)?;
    let previous = keyed(previous)?;

    let keys: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();
    let mut difference = ConfigDifference::new();
    for key in keys {
        compare_commands(
            &mut difference,
            key,
            current.get(key).map(String::as_str),
            previous.get(key).map(String::as_str),
        );
    }
    Ok(difference)
}
