//! Topology descriptor types.
//!
//! These mirror the YAML document one-to-one. Every per-entity field except
//! the name is optional here; the default-merge pass fills them in and the
//! resolved records in [`crate::topology::types`] are built from the result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Root of a topology descriptor file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,
    #[serde(default, rename = "host", skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<HostSpec>>,
    #[serde(default, rename = "switch", skip_serializing_if = "Option::is_none")]
    pub switches: Option<Vec<SwitchSpec>>,
    #[serde(default, rename = "link", skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkSpec>>,
}

impl TopologyDocument {
    /// Validate the structure of the document.
    ///
    /// Only checks what has to hold before any resolution starts: at least
    /// one switch and unique entity names. Link endpoints are checked later
    /// by the provisioning stage.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.switches().is_empty() {
            return Err(ConfigurationError::NoSwitches);
        }

        let mut seen = HashSet::new();
        for host in self.hosts() {
            if !seen.insert(host.name.as_str()) {
                return Err(ConfigurationError::DuplicateName {
                    kind: EntityKind::Host,
                    name: host.name.clone(),
                });
            }
        }
        for switch in self.switches() {
            if !seen.insert(switch.name.as_str()) {
                return Err(ConfigurationError::DuplicateName {
                    kind: EntityKind::Switch,
                    name: switch.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn hosts(&self) -> &[HostSpec] {
        self.hosts.as_deref().unwrap_or_default()
    }

    pub fn switches(&self) -> &[SwitchSpec] {
        self.switches.as_deref().unwrap_or_default()
    }

    pub fn links(&self) -> &[LinkSpec] {
        self.links.as_deref().unwrap_or_default()
    }

    /// Host defaults, empty when the section or `defaults` itself is absent
    pub fn host_defaults(&self) -> HostDefaults {
        self.defaults
            .as_ref()
            .and_then(|d| d.host.clone())
            .unwrap_or_default()
    }

    /// Switch defaults, empty when the section or `defaults` itself is absent
    pub fn switch_defaults(&self) -> SwitchDefaults {
        self.defaults
            .as_ref()
            .and_then(|d| d.switch.clone())
            .unwrap_or_default()
    }
}

/// The `defaults` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostDefaults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<SwitchDefaults>,
}

/// Kind-level defaults applied to every host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

/// Kind-level defaults applied to every switch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4src: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump: Option<bool>,
    /// First listen port handed out to switches without an explicit port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<PathBuf>,
    /// Behavioral model base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmv2: Option<PathBuf>,
    /// P4 compiler base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4c: Option<PathBuf>,
}

/// A host entry as written in the descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

/// A switch entry as written in the descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4src: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmv2: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4c: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,
}

/// A link between two named entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub source: String,
    pub destination: String,
}

/// Kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Host,
    Switch,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Host => "host",
            EntityKind::Switch => "switch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topology configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("switches not found in the topology")]
    NoSwitches,
    #[error("{kind} '{name}' is missing required field '{field}'")]
    MissingField {
        kind: EntityKind,
        name: String,
        field: &'static str,
    },
    #[error("{kind} name '{name}' is declared more than once")]
    DuplicateName { kind: EntityKind, name: String },
    #[error("link {src} <-> {dst} refers to unknown entity '{endpoint}'")]
    UnknownEndpoint {
        src: String,
        dst: String,
        endpoint: String,
    },
}
