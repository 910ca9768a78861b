//! Declarative router configuration compiler.
//!
//! A configuration is a directory tree of YAML descriptors: global settings,
//! address and port groups, a NAT rule set and one directory per network with
//! its interfaces, firewalls and hosts. This library loads such a tree,
//! validates it, and compiles it into ordered device CLI commands that can be
//! diffed against a previous snapshot and applied in safe batches.
//!
//! # Architecture
//!
//! ## Model
//!
//! - [`attributes`]: Attribute registry: name -> predicate plus accumulated errors
//! - [`predicates`]: The predicates entity schemas are built from
//! - [`model`]: Entities from [`model::RootNode`] down to [`model::Rule`]
//! - [`loader`]: Sorted, read-only access to the descriptor tree
//!
//! ## Synthesis
//!
//! - [`synthesis`]: Host `connections`, `forward-ports` and `hairpin-ports`
//!   turned into firewall and NAT rules while the tree loads
//!
//! ## Validation
//!
//! - [`verify`]: Consistency orchestration and report rendering
//! - [`verify_networks`]: Subnet overlap, containment, host uniqueness
//! - [`verify_rules`]: Rule-number collisions and connection sides
//! - [`verify_refs`]: Port-group references
//! - [`verify_dupes`]: Duplicate values in flat collections
//! - [`catalog`]: Port groups a configuration may reference
//!
//! ## Output
//!
//! - [`emit`]: Shared command emission helpers
//! - [`snapshot`]: Flat command snapshots between runs
//! - [`deploy`] / [`script`]: Deploy options and per-batch shell scripts
//! - [`report`]: Colored terminal rendering of differences and batches
//!
//! Differencing and batch sequencing live in `command_diff_core`.
//!
//! # Workflow
//!
//! 1. **Load** the tree with [`model::RootNode::load`]; host policy is
//!    synthesized as each network loads
//! 2. **Validate** structure and consistency with `validate()`
//! 3. **Emit** grouped and flat commands with `commands()`
//! 4. **Diff** the flat list against the previous snapshot
//! 5. **Sequence** the difference into batches and render deploy scripts
//!
//! # Examples
//!
//! ```ignore
//! use std::path::Path;
//!
//! use netcfg::model::RootNode;
//!
//! let mut root = RootNode::load(Path::new("site"))?;
//! if !root.validate() {
//!     for error in root.errors() {
//!         eprintln!("{error}");
//!     }
//! }
//! let previous = netcfg::snapshot::load_snapshot(Path::new("commands.snapshot"))?;
//! let batches = root.commands_to_run(&previous, true)?;
//! ```

pub mod attributes;
pub mod catalog;
pub mod deploy;
pub mod emit;
pub mod error;
pub mod loader;
pub mod model;
pub mod predicates;
pub mod report;
pub mod script;
pub mod snapshot;
pub mod synthesis;
pub mod verify;
pub mod verify_dupes;
pub mod verify_networks;
pub mod verify_refs;
pub mod verify_rules;

pub use error::{ConfigError, Result};
