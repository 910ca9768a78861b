use crate::diff::result::ConfigDifference;

/// Format a difference as JSON.
pub fn format_json(difference: &ConfigDifference) -> String {
    serde_json::to_string_pretty(difference).unwrap_or_else(|_| "{}".to_string())
}
