use colored::Colorize;
use command_diff_core::{format_batches, format_summary, format_text, ConfigDifference};

/// Render a difference for terminal output.
pub fn render_difference(difference: &ConfigDifference, include_preserved: bool) -> String {
    let raw = format_text(difference, include_preserved);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else {
            line.dimmed().to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_summary(difference: &ConfigDifference) -> String {
    format_summary(difference).cyan().to_string()
}

/// Render batches with bold headers.
pub fn render_batches(batches: &[Vec<String>]) -> String {
    format_batches(batches)
        .lines()
        .map(|line| {
            if line.starts_with("# batch") {
                line.bold().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
