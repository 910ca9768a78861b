use crate::diff::result::ConfigDifference;

/// Format a difference as plain text, one key per line.
///
/// Preserved keys are only listed when `include_preserved` is set.
pub fn format_text(difference: &ConfigDifference, include_preserved: bool) -> String {
    let mut lines = Vec::new();
    for (key, value) in &difference.removed {
        lines.push(format!("- {key} {value}"));
    }
    for (key, value) in &difference.added {
        lines.push(format!("+ {key} {value}"));
    }
    for (key, value) in &difference.changed {
        lines.push(format!("~ {key} {value}"));
    }
    if include_preserved {
        for (key, value) in &difference.preserved {
            lines.push(format!("= {key} {value}"));
        }
    }
    lines.join("\n")
}

/// Format a simple summary of difference counts.
pub fn format_summary(difference: &ConfigDifference) -> String {
    format!(
        "added={} removed={} changed={} preserved={}",
        difference.added.len(),
        difference.removed.len(),
        difference.changed.len(),
        difference.preserved.len()
    )
}

/// Format batches with a header line per batch.
pub fn format_batches(batches: &[Vec<String>]) -> String {
    let mut lines = Vec::new();
    for (idx, batch) in batches.iter().enumerate() {
        lines.push(format!("# batch {idx}"));
        lines.extend(batch.iter().cloned());
    }
    lines.join("\n")
}
