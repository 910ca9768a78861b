//! Generic line-oriented CLI command primitives used by higher-level tools.

pub mod batch;
pub mod command;
pub mod diff;
pub mod format;
pub mod words;

pub use batch::commands_to_run;
pub use command::{Command, CommandError, CommandSet};
pub use diff::{compare_commands, diff_configurations, keyed, ConfigDifference};
pub use format::{format_batches, format_json, format_summary, format_text};
pub use words::{quote, quote_description, split};
