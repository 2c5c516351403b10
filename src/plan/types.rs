//! Emulator plan type definitions.
//!
//! The plan is the read-only view of a resolved topology that the Mininet
//! launcher consumes. Field names follow the arguments of the emulator's
//! `addHost` / `addSwitch` / `addLink` calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root of the plan file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPlan {
    pub hosts: Vec<PlanHost>,
    pub switches: Vec<PlanSwitch>,
    pub links: Vec<PlanLink>,
}

/// An emulated host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanHost {
    pub name: String,
    pub ip: String,
    pub mac: String,
    /// `via <gateway>` when the host has a gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,
    /// Switch this host is plugged into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    /// Shell commands run on the host once the network is up
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

/// A P4 software switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSwitch {
    pub name: String,
    pub sw_path: PathBuf,
    pub json_path: PathBuf,
    pub thrift_port: u16,
    pub verbose: String,
    pub pcap_dump: bool,
    pub device_id: u32,
    /// Local port number facing each peer
    pub ports: BTreeMap<String, u32>,
}

/// A link with the port used on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLink {
    pub source: String,
    pub destination: String,
    pub source_port: u32,
    pub destination_port: u32,
}
