//! Network topology module.
//!
//! Resolved host and switch records, plus the link pass that numbers ports
//! and finds which switch each host is attached to.

pub mod links;
pub mod types;

pub use links::{resolve_links, HostAttachment, LinkResolution, PortMap, ResolvedLink};
pub use types::{Host, ResolvedTopology, Switch};
