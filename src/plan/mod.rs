//! Emulator plan generation.
//!
//! Turns a [`ResolvedTopology`] into the plan file read by the Mininet
//! launcher. The format follows the output file extension: `.json` writes
//! pretty-printed JSON, anything else YAML.
//!
//! ```yaml
//! hosts:
//! - name: h1
//!   ip: 10.0.1.1
//!   mac: 00:00:00:00:00:01
//!   default_route: via 10.0.1.254
//!   switch: s1
//! switches:
//! - name: s1
//!   sw_path: ../bmv2/targets/simple_switch/simple_switch
//!   json_path: router.p4.json
//!   thrift_port: 22222
//!   verbose: info
//!   pcap_dump: true
//!   device_id: 1
//!   ports:
//!     h1: 1
//! links:
//! - source: h1
//!   destination: s1
//!   source_port: 1
//!   destination_port: 1
//! ```

pub mod types;

pub use types::{NetworkPlan, PlanHost, PlanLink, PlanSwitch};

use crate::topology::ResolvedTopology;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::path::Path;

impl NetworkPlan {
    pub fn from_resolved(topology: &ResolvedTopology) -> Self {
        let hosts = topology
            .hosts
            .iter()
            .map(|host| PlanHost {
                name: host.name.clone(),
                ip: host.ip.clone(),
                mac: host.mac.to_string(),
                default_route: host.default_route(),
                switch: topology
                    .host_attachment
                    .switch_for(&host.name)
                    .map(str::to_string),
                commands: host.commands.clone(),
            })
            .collect();

        let switches = topology
            .switches
            .iter()
            .map(|switch| PlanSwitch {
                name: switch.name.clone(),
                sw_path: switch.sw_path.clone(),
                json_path: switch.p4json.clone(),
                thrift_port: switch.port,
                verbose: switch.verbose.clone(),
                pcap_dump: switch.dump,
                device_id: switch.id,
                ports: topology
                    .port_map
                    .peers(&switch.name)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        let links = topology
            .links
            .iter()
            .map(|link| PlanLink {
                source: link.source.clone(),
                destination: link.destination.clone(),
                source_port: link.source_port,
                destination_port: link.destination_port,
            })
            .collect();

        NetworkPlan {
            hosts,
            switches,
            links,
        }
    }

    /// Serialize in the format implied by `path`
    pub fn render(&self, path: &Path) -> Result<String> {
        let is_json = path.extension().map_or(false, |ext| ext == "json");
        if is_json {
            serde_json::to_string_pretty(self).wrap_err("Failed to serialize plan as JSON")
        } else {
            serde_yaml::to_string(self).wrap_err("Failed to serialize plan as YAML")
        }
    }
}

/// Write the emulator plan for `topology` to `output_path`
pub fn write_plan(topology: &ResolvedTopology, output_path: &Path) -> Result<NetworkPlan> {
    let plan = NetworkPlan::from_resolved(topology);
    let content = plan.render(output_path)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(output_path, content)
        .wrap_err_with(|| format!("Failed to write plan '{}'", output_path.display()))?;

    info!(
        "Wrote plan with {} hosts, {} switches, {} links to {:?}",
        plan.hosts.len(),
        plan.switches.len(),
        plan.links.len(),
        output_path
    );
    Ok(plan)
}
