//! Read-only access to a configuration directory tree.
//!
//! All listings are sorted lexically so that tree construction, and with it
//! rule-number allocation, is reproducible for identical input.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::attributes::Attributes;
use crate::error::{ConfigError, Result};
use crate::predicates::RULE_NUMBER_MAX;

/// File name of the descriptor that marks a configured directory.
pub const DESCRIPTOR: &str = "config.yaml";

/// Parse one YAML file. An empty file yields `null`.
pub fn load_structured(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    debug!(path = %path.display(), "loading descriptor");
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a YAML file that must hold a mapping (or nothing at all).
pub fn load_attributes(path: &Path) -> Result<Attributes> {
    attributes_from(load_structured(path)?, path)
}

/// Convert a parsed value into an attribute map.
pub fn attributes_from(value: Value, path: &Path) -> Result<Attributes> {
    match value {
        Value::Null => Ok(Attributes::new()),
        Value::Mapping(_) => serde_yaml::from_value(value).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::malformed(path, "expected a mapping")),
    }
}

/// Every `*.yaml` / `*.yml` file directly inside `dirs`, sorted.
///
/// Missing directories are skipped.
pub fn list_descriptor_files(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for dir in dirs {
        for path in read_dir_sorted(dir)? {
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if is_yaml && path.is_file() {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Every subdirectory of `dirs` that holds a [`DESCRIPTOR`], sorted.
pub fn list_configured_subdirectories(dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for dir in dirs {
        for path in read_dir_sorted(dir)? {
            if path.is_dir() && path.join(DESCRIPTOR).is_file() {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

/// Final path component as text.
pub fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(ToOwned::to_owned)
        .ok_or_else(|| ConfigError::malformed(path, "path has no usable name"))
}

/// Rule number taken from a `<number>.yaml` file name.
pub fn rule_number_from(path: &Path) -> Result<u32> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| (1..=RULE_NUMBER_MAX).contains(n))
        .ok_or_else(|| {
            ConfigError::malformed(
                path,
                format!("rule file name must be a number from 1 to {RULE_NUMBER_MAX}"),
            )
        })
}

/// Rule files of a firewall or NAT directory: every descriptor but [`DESCRIPTOR`].
pub fn list_rule_files(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut out = Vec::new();
    for path in list_descriptor_files(&[dir.to_path_buf()])? {
        if path.file_name().is_some_and(|n| n == DESCRIPTOR) {
            continue;
        }
        out.push((rule_number_from(&path)?, path));
    }
    out.sort();
    Ok(out)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))? {
        let entry = entry.map_err(|e| ConfigError::io(dir, e))?;
        out.push(entry.path());
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{list_configured_subdirectories, list_descriptor_files, list_rule_files};

    #[test]
    fn listings_are_sorted_and_filtered() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        for name in ["b", "a", "c"] {
            fs::create_dir_all(root.join(name)).expect("mkdir");
        }
        fs::write(root.join("b/config.yaml"), "").expect("write");
        fs::write(root.join("a/config.yaml"), "").expect("write");
        fs::write(root.join("z.yaml"), "").expect("write");
        fs::write(root.join("notes.txt"), "").expect("write");
        fs::write(root.join("m.yml"), "").expect("write");

        let subdirs = list_configured_subdirectories(&[root.to_path_buf()]).expect("subdirs");
        assert_eq!(subdirs, vec![root.join("a"), root.join("b")]);

        let files = list_descriptor_files(&[root.to_path_buf()]).expect("files");
        assert_eq!(files, vec![root.join("m.yml"), root.join("z.yaml")]);
    }

    #[test]
    fn rule_files_sort_numerically_and_reject_bad_names() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("config.yaml"), "").expect("write");
        fs::write(root.join("100.yaml"), "").expect("write");
        fs::write(root.join("20.yaml"), "").expect("write");

        let rules = list_rule_files(root).expect("rules");
        assert_eq!(
            rules.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            vec![20, 100]
        );

        fs::write(root.join("web.yaml"), "").expect("write");
        assert!(list_rule_files(root).is_err());
    }

    #[test]
    fn rule_files_beyond_highest_number_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("9999.yaml"), "").expect("write");
        assert_eq!(list_rule_files(root).expect("rules").len(), 1);

        fs::write(root.join("4294967295.yaml"), "").expect("write");
        let err = list_rule_files(root).expect_err("out of range");
        assert!(err
            .to_string()
            .contains("rule file name must be a number from 1 to 9999"));
    }
}
