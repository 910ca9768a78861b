//! Snapshot-to-snapshot command diffing.

pub mod engine;
pub mod result;

pub use engine::{compare_commands, diff_configurations, keyed};
pub use result::ConfigDifference;
