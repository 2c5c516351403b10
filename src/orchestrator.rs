//! Topology resolution pipeline.
//!
//! Runs the passes in order: host defaults, host MACs, switch defaults,
//! switch ids, then links. Each run owns its own allocators and port counter,
//! so resolving the same document twice gives identical output.

use crate::config::{ConfigurationError, TopologyDocument};
use crate::defaults::{merge_host_defaults, SwitchMerge};
use crate::identity::IdentityResolver;
use crate::topology::{resolve_links, Host, ResolvedTopology, Switch};
use crate::utils::toolchain::{ToolchainEnv, ToolchainOverrides};
use log::{info, warn};
use std::collections::HashSet;
use std::path::PathBuf;

/// Inputs to resolution that do not come from the topology document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    pub overrides: ToolchainOverrides,
    pub env: ToolchainEnv,
    /// Directory searched for `commands-<switch>.txt`
    pub workdir: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            overrides: ToolchainOverrides::default(),
            env: ToolchainEnv::default(),
            workdir: PathBuf::from("."),
        }
    }
}

impl ResolveOptions {
    /// Options with the toolchain base directories read from the environment
    pub fn from_env(overrides: ToolchainOverrides) -> Self {
        ResolveOptions {
            overrides,
            env: ToolchainEnv::from_env(),
            ..Default::default()
        }
    }
}

/// Resolve a loaded document into a fully populated topology
pub fn resolve_topology(
    mut document: TopologyDocument,
    options: &ResolveOptions,
) -> Result<ResolvedTopology, ConfigurationError> {
    // Validate the document before touching any entity
    document.validate()?;

    let mut identities = IdentityResolver::new();

    // Hosts: defaults, then MACs
    let host_defaults = document.host_defaults();
    let mut hosts = Vec::with_capacity(document.hosts().len());
    for mut spec in document.hosts.take().unwrap_or_default() {
        merge_host_defaults(&mut spec, &host_defaults);
        let mac = identities.assign_host_mac(&mut spec);
        hosts.push(Host::resolve(spec, mac)?);
    }
    info!("Resolved {} hosts", hosts.len());

    // Switches: defaults and thrift ports, then device ids
    let mut switch_merge = SwitchMerge::new(
        &document.switch_defaults(),
        &options.overrides,
        &options.env,
        &options.workdir,
    );
    let mut switches = Vec::with_capacity(document.switches().len());
    for mut spec in document.switches.take().unwrap_or_default() {
        switch_merge.apply(&mut spec);
        let id = identities.assign_switch_id(&mut spec);
        switches.push(Switch::resolve(spec, id)?);
    }
    if !switch_merge.port_clashes().is_empty() {
        warn!(
            "{} switch(es) share a thrift port with an earlier switch",
            switch_merge.port_clashes().len()
        );
    }
    info!("Resolved {} switches", switches.len());

    // Links: port numbers and host attachment
    let host_names: HashSet<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
    let switch_names: HashSet<&str> = switches.iter().map(|s| s.name.as_str()).collect();
    let resolution = resolve_links(document.links(), &host_names, &switch_names);
    info!(
        "Resolved {} links, {} hosts attached to switches",
        resolution.links.len(),
        resolution.host_attachment.len()
    );

    Ok(ResolvedTopology {
        hosts,
        switches,
        links: resolution.links,
        port_map: resolution.port_map,
        host_attachment: resolution.host_attachment,
    })
}
