//! Deploy options read from a TOML file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

pub const DEFAULT_SHELL: &str = "/bin/vbash";
pub const DEFAULT_WRAPPER: &str = "/opt/vyatta/sbin/vyatta-cfg-cmd-wrapper";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Interpreter named on the script's `#!` line.
    pub shell: String,
    /// Configuration command wrapper every command is run through.
    pub wrapper: String,
    /// Discard pending changes before exiting on a failed command.
    pub rollback: bool,
    /// Commit with `commit-confirm <minutes>` instead of a plain commit.
    pub commit_confirm: Option<u32>,
    pub save: bool,
    pub apply_difference_only: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            wrapper: DEFAULT_WRAPPER.to_string(),
            rollback: true,
            commit_confirm: None,
            save: true,
            apply_difference_only: false,
        }
    }
}

pub fn parse_deploy_config(raw: &str, path: &Path) -> Result<DeployConfig> {
    toml::from_str(raw).map_err(|source| ConfigError::Deploy {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_deploy_config(path: &Path) -> Result<DeployConfig> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_deploy_config(&raw, path)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::{parse_deploy_config, DeployConfig};

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_deploy_config("", Path::new("deploy.toml")).expect("parse");
        assert_eq!(config, DeployConfig::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = parse_deploy_config(
            "rollback = false\ncommit-confirm = 10\napply-difference-only = true\n",
            Path::new("deploy.toml"),
        )
        .expect("parse");
        assert!(!config.rollback);
        assert_eq!(config.commit_confirm, Some(10));
        assert!(config.apply_difference_only);
        assert!(config.save);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_deploy_config("colour = \"red\"\n", Path::new("deploy.toml"))
            .expect_err("unknown key");
        assert!(err.to_string().contains("deploy.toml"));
    }
}
