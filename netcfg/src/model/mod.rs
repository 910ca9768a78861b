//! Configuration entities.
//!
//! Every entity keeps its attributes in a [`Descriptor`](crate::attributes::Descriptor),
//! validates them on demand and emits its own commands. Parents own their
//! children; the only cross-link is the NAT handle networks borrow while
//! hosts are synthesized.

pub mod external;
pub mod firewall;
pub mod global;
pub mod host;
pub mod interface;
pub mod nat;
pub mod network;
pub mod port_group;
pub mod root;
pub mod rule;

pub use external::{ExternalAddresses, EXTERNAL_GROUP};
pub use firewall::{Direction, Firewall};
pub use global::GlobalSettings;
pub use host::Host;
pub use interface::Interface;
pub use nat::{Nat, NatRule};
pub use network::Network;
pub use port_group::PortGroup;
pub use root::RootNode;
pub use rule::{Rule, RuleOrigin};
