//! Pre-flight checks on a resolved topology.
//!
//! Resolution never looks at the filesystem beyond the conventional rules
//! files, and never checks link endpoints. Both are verified here, right
//! before anything external is started.

use super::ProvisionError;
use crate::config::ConfigurationError;
use crate::topology::{ResolvedTopology, Switch};
use log::info;
use std::path::Path;

/// Check that a switch's program, tools and rules file exist
pub fn check_switch_paths(switch: &Switch) -> Result<(), ProvisionError> {
    require_file(switch, "p4 source file", &switch.p4src)?;
    require_file(switch, "cli file", &switch.cli)?;
    if let Some(commands) = &switch.commands {
        require_file(switch, "commands file", commands)?;
    }
    require_file(switch, "switch path", &switch.sw_path)?;
    Ok(())
}

fn require_file(switch: &Switch, what: &'static str, path: &Path) -> Result<(), ProvisionError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProvisionError::MissingFile {
            switch: switch.name.clone(),
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Check that every link endpoint is a declared host or switch
pub fn check_links(topology: &ResolvedTopology) -> Result<(), ConfigurationError> {
    for link in &topology.links {
        for endpoint in [&link.source, &link.destination] {
            if !topology.contains(endpoint) {
                return Err(ConfigurationError::UnknownEndpoint {
                    src: link.source.clone(),
                    dst: link.destination.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Run all pre-flight checks
pub fn validate_topology(topology: &ResolvedTopology) -> Result<(), ProvisionError> {
    check_links(topology)?;
    for switch in &topology.switches {
        check_switch_paths(switch)?;
    }
    info!("All {} switches passed path checks", topology.switches.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{HostAttachment, PortMap, ResolvedLink};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn switch_in(dir: &TempDir) -> Switch {
        let file = |name: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, "").unwrap();
            path
        };
        Switch {
            name: "s1".to_string(),
            id: 1,
            port: 22222,
            p4src: file("router.p4"),
            p4json: dir.path().join("router.p4.json"),
            sw_path: file("simple_switch"),
            cli: file("runtime_CLI.py"),
            compiler: file("p4c"),
            commands: None,
            dump: true,
            verbose: "info".to_string(),
        }
    }

    fn topology(switch: Switch, links: Vec<(&str, &str)>) -> ResolvedTopology {
        ResolvedTopology {
            hosts: vec![],
            switches: vec![switch],
            links: links
                .into_iter()
                .map(|(s, d)| ResolvedLink {
                    source: s.to_string(),
                    destination: d.to_string(),
                    source_port: 1,
                    destination_port: 1,
                })
                .collect(),
            port_map: PortMap::default(),
            host_attachment: HostAttachment::default(),
        }
    }

    #[test]
    fn test_paths_present() {
        let dir = TempDir::new().unwrap();
        assert!(check_switch_paths(&switch_in(&dir)).is_ok());
    }

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let sw = Switch {
            p4src: PathBuf::from("/nonexistent/router.p4"),
            ..switch_in(&dir)
        };
        let err = check_switch_paths(&sw).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingFile { what: "p4 source file", .. }));
        assert!(err.to_string().contains("for switch s1"));
    }

    #[test]
    fn test_missing_commands_file() {
        let dir = TempDir::new().unwrap();
        let sw = Switch {
            commands: Some(dir.path().join("commands-s1.txt")),
            ..switch_in(&dir)
        };
        let err = check_switch_paths(&sw).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingFile { what: "commands file", .. }));
    }

    #[test]
    fn test_unknown_link_endpoint() {
        let dir = TempDir::new().unwrap();
        let topo = topology(switch_in(&dir), vec![("s1", "h9")]);
        let err = check_links(&topo).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownEndpoint {
                src: "s1".to_string(),
                dst: "h9".to_string(),
                endpoint: "h9".to_string(),
            }
        );
        assert!(validate_topology(&topo).is_err());
    }
}
