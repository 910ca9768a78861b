use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use thiserror::Error;

use crate::words::{quote, split};

/// Errors raised while decomposing command lines.
///
/// These are fatal: a command stream that cannot be decomposed cannot be
/// sequenced safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A quoted section was never closed.
    #[error("unterminated quote in command: {line}")]
    UnterminatedQuote { line: String },
    /// The line ends with a lone backslash.
    #[error("trailing escape in command: {line}")]
    TrailingEscape { line: String },
    /// The line contains no words at all.
    #[error("command has no value token: {line:?}")]
    MissingValue { line: String },
    /// The line is a single word, leaving nothing to use as a key.
    #[error("command has no key tokens: {line}")]
    MissingKey { line: String },
}

/// A command split into its key (every word but the last) and its value.
///
/// Key words are kept in their shell-safe form, so a word containing spaces
/// stays one word when the key is written back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub key: String,
    pub value: String,
}

impl Command {
    /// Decompose a command line into key and value.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = split(line)?;
        let Some(value) = words.pop() else {
            return Err(CommandError::MissingValue {
                line: line.to_string(),
            });
        };
        if words.is_empty() {
            return Err(CommandError::MissingKey {
                line: line.to_string(),
            });
        }
        Ok(Self {
            key: words
                .iter()
                .map(|word| quote(word))
                .collect::<Vec<_>>()
                .join(" "),
            value,
        })
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, quote(&self.value))
    }
}

/// Commands in application order, both grouped and flattened.
///
/// Each group is applied atomically; `flat` is the concatenation of all
/// groups and is what gets compared between snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    pub groups: Vec<Vec<String>>,
    pub flat: Vec<String>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one atomic group. Empty groups are skipped.
    pub fn push_group(&mut self, group: Vec<String>) {
        if group.is_empty() {
            return;
        }
        self.flat.extend(group.iter().cloned());
        self.groups.push(group);
    }

    /// Append every group of `other`, keeping its order.
    pub fn append(&mut self, other: CommandSet) {
        for group in other.groups {
            self.push_group(group);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

impl FromIterator<Vec<String>> for CommandSet {
    fn from_iter<T: IntoIterator<Item = Vec<String>>>(iter: T) -> Self {
        let mut set = Self::new();
        for group in iter {
            set.push_group(group);
        }
        set
    }
}
