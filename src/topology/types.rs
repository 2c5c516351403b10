//! Fully resolved topology records.
//!
//! These are what the provisioning stage consumes. Every field is set; the
//! only optional values left are a host gateway and a switch rules file,
//! both of which are legitimately absent.

use super::links::{HostAttachment, PortMap, ResolvedLink};
use crate::config::{ConfigurationError, EntityKind, HostSpec, SwitchSpec};
use crate::identity::Mac;
use crate::utils::compiled_artifact_path;
use serde::Serialize;
use std::path::PathBuf;

/// An emulated host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Host {
    pub name: String,
    pub ip: String,
    pub mac: Mac,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    pub commands: Vec<String>,
}

impl Host {
    /// Build the resolved host from a merged entry and its assigned MAC
    pub fn resolve(spec: HostSpec, mac: Mac) -> Result<Host, ConfigurationError> {
        let ip = spec.ip.ok_or_else(|| ConfigurationError::MissingField {
            kind: EntityKind::Host,
            name: spec.name.clone(),
            field: "ip",
        })?;

        Ok(Host {
            name: spec.name,
            ip,
            mac,
            gateway: spec.gw,
            commands: spec.command.unwrap_or_default(),
        })
    }

    /// Default route argument for the emulator, `via <gw>`
    pub fn default_route(&self) -> Option<String> {
        self.gateway.as_ref().map(|gw| format!("via {}", gw))
    }
}

/// A P4 software switch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Switch {
    pub name: String,
    pub id: u32,
    /// Thrift port the runtime CLI connects to
    pub port: u16,
    pub p4src: PathBuf,
    pub p4json: PathBuf,
    pub sw_path: PathBuf,
    pub cli: PathBuf,
    pub compiler: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<PathBuf>,
    pub dump: bool,
    pub verbose: String,
}

impl Switch {
    /// Build the resolved switch from a merged entry and its assigned id
    pub fn resolve(spec: SwitchSpec, id: u32) -> Result<Switch, ConfigurationError> {
        let name = spec.name;
        let missing = |field: &'static str| ConfigurationError::MissingField {
            kind: EntityKind::Switch,
            name: name.clone(),
            field,
        };

        let p4src = spec.p4src.ok_or_else(|| missing("p4src"))?;
        let port = spec.port.ok_or_else(|| missing("port"))?;
        let sw_path = spec.sw_path.ok_or_else(|| missing("sw_path"))?;
        let cli = spec.cli.ok_or_else(|| missing("cli"))?;
        let compiler = spec.compiler.ok_or_else(|| missing("compiler"))?;
        let dump = spec.dump.ok_or_else(|| missing("dump"))?;
        let verbose = spec.verbose.ok_or_else(|| missing("verbose"))?;

        Ok(Switch {
            p4json: compiled_artifact_path(&p4src),
            name,
            id,
            port,
            p4src,
            sw_path,
            cli,
            compiler,
            commands: spec.commands,
            dump,
            verbose,
        })
    }
}

/// The whole resolved graph handed to provisioning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTopology {
    pub hosts: Vec<Host>,
    pub switches: Vec<Switch>,
    pub links: Vec<ResolvedLink>,
    pub port_map: PortMap,
    pub host_attachment: HostAttachment,
}

impl ResolvedTopology {
    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|h| h.name == name)
    }

    pub fn switch(&self, name: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.name == name)
    }

    /// True if `name` is a declared host or switch
    pub fn contains(&self, name: &str) -> bool {
        self.host(name).is_some() || self.switch(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged_switch() -> SwitchSpec {
        SwitchSpec {
            name: "s1".to_string(),
            port: Some(22222),
            p4src: Some(PathBuf::from("router.p4")),
            dump: Some(true),
            verbose: Some("info".to_string()),
            sw_path: Some(PathBuf::from("/bmv2/simple_switch")),
            cli: Some(PathBuf::from("/bmv2/runtime_CLI.py")),
            compiler: Some(PathBuf::from("/p4c/__main__.py")),
            ..Default::default()
        }
    }

    #[test]
    fn test_host_requires_ip() {
        let spec = HostSpec {
            name: "h3".to_string(),
            ..Default::default()
        };
        let err = Host::resolve(spec, Mac::from_u64(3).unwrap()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingField {
                kind: EntityKind::Host,
                name: "h3".to_string(),
                field: "ip",
            }
        );
    }

    #[test]
    fn test_host_default_route() {
        let spec = HostSpec {
            name: "h1".to_string(),
            ip: Some("10.0.0.1/24".to_string()),
            gw: Some("10.0.0.254".to_string()),
            ..Default::default()
        };
        let host = Host::resolve(spec, Mac::from_u64(1).unwrap()).unwrap();
        assert_eq!(host.default_route().as_deref(), Some("via 10.0.0.254"));
        assert!(host.commands.is_empty());
    }

    #[test]
    fn test_switch_derives_compiled_path() {
        let sw = Switch::resolve(merged_switch(), 1).unwrap();
        assert_eq!(sw.p4json, PathBuf::from("router.p4.json"));
        assert_eq!(sw.id, 1);
    }

    #[test]
    fn test_switch_requires_program() {
        let spec = SwitchSpec {
            p4src: None,
            ..merged_switch()
        };
        let err = Switch::resolve(spec, 1).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingField { field: "p4src", .. }
        ));
    }
}
