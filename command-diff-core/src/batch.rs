//! Turn a difference into ordered, deployable batches.
//!
//! Batch 0 always removes everything that disappeared since the previous
//! snapshot, and is present even when nothing did. Every following batch
//! mirrors one group of the current command set, in the set's own order.
//! Group batches left empty by filtering are dropped.

use crate::command::{Command, CommandError, CommandSet};
use crate::diff::engine::diff_configurations;
use crate::words::quote;

/// Build the batches that move a device from `previous` to `current`.
///
/// With `apply_difference_only`, a current command is kept only when its key
/// was added or changed; otherwise every current command is re-applied.
pub fn commands_to_run<P: AsRef<str>>(
    current: &CommandSet,
    previous: &[P],
    apply_difference_only: bool,
) -> Result<Vec<Vec<String>>, CommandError> {
    let difference = diff_configurations(&current.flat, previous)?;
    let mut batches = Vec::with_capacity(current.groups.len() + 1);

    batches.push(
        difference
            .removed
            .iter()
            .map(|(key, value)| format!("delete {key} {}", quote(value)))
            .collect(),
    );

    for group in &current.groups {
        let mut batch = Vec::with_capacity(group.len());
        for line in group {
            if apply_difference_only && !difference.needs_apply(&Command::parse(line)?.key) {
                continue;
            }
            batch.push(format!("set {line}"));
        }
        if !batch.is_empty() {
            batches.push(batch);
        }
    }

    Ok(batches)
}
