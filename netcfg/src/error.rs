//! Fatal errors raised while loading a configuration tree.
//!
//! Validation problems are not errors in this sense: they are collected on
//! the entities and reported after `validate()`. Anything here aborts the
//! operation, because a half-understood tree must never reach a device.

use std::path::PathBuf;

use command_diff_core::CommandError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("malformed descriptor {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("host '{host}' in network '{network}' needs a '{direction}' firewall but none is attached")]
    MissingFirewall {
        network: String,
        host: String,
        direction: String,
    },

    #[error("{owner}: no free rule number up to {max}", max = crate::predicates::RULE_NUMBER_MAX)]
    RuleNumbersExhausted { owner: String },

    #[error("failed to parse deploy config {path}: {source}")]
    Deploy {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
