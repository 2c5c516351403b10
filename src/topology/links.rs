//! Link and port resolution.
//!
//! Every endpoint keeps a running port counter starting at 1. Links are
//! walked in declaration order and each link bumps the counter of its source
//! and then of its destination, so port numbers reflect how often an entity
//! has appeared so far. Endpoint names are not checked here.

use crate::config::LinkSpec;
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Local port numbers, keyed by endpoint and then by peer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PortMap(BTreeMap<String, BTreeMap<String, u32>>);

impl PortMap {
    /// Port on `endpoint` that faces `peer`
    pub fn port(&self, endpoint: &str, peer: &str) -> Option<u32> {
        self.0.get(endpoint).and_then(|peers| peers.get(peer)).copied()
    }

    /// All peers of `endpoint` with the local port facing each
    pub fn peers(&self, endpoint: &str) -> Option<&BTreeMap<String, u32>> {
        self.0.get(endpoint)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn insert(&mut self, endpoint: &str, peer: &str, port: u32) {
        self.0
            .entry(endpoint.to_string())
            .or_default()
            .insert(peer.to_string(), port);
    }
}

/// The switch each host is plugged into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostAttachment(BTreeMap<String, String>);

impl HostAttachment {
    pub fn switch_for(&self, host: &str) -> Option<&str> {
        self.0.get(host).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(h, s)| (h.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn attach(&mut self, host: &str, switch: &str) {
        if let Some(previous) = self.0.insert(host.to_string(), switch.to_string()) {
            if previous != switch {
                // later link wins
                warn!(
                    "host {} is linked to both {} and {}, attaching it to {}",
                    host, previous, switch, switch
                );
            }
        }
    }
}

/// A link with the local port number on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLink {
    pub source: String,
    pub destination: String,
    pub source_port: u32,
    pub destination_port: u32,
}

/// Output of [`resolve_links`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkResolution {
    pub links: Vec<ResolvedLink>,
    pub port_map: PortMap,
    pub host_attachment: HostAttachment,
}

/// Number the ports of every link and find each host's switch in one pass.
///
/// `hosts` and `switches` only classify endpoints for the attachment map;
/// links between two hosts or two switches still get port numbers.
pub fn resolve_links(
    links: &[LinkSpec],
    hosts: &HashSet<&str>,
    switches: &HashSet<&str>,
) -> LinkResolution {
    let mut counters: HashMap<&str, u32> = HashMap::new();
    let mut resolution = LinkResolution::default();

    for link in links {
        let src = link.source.as_str();
        let dst = link.destination.as_str();

        let source_port = next_port(&mut counters, src);
        let destination_port = next_port(&mut counters, dst);

        resolution.port_map.insert(src, dst, source_port);
        resolution.port_map.insert(dst, src, destination_port);
        resolution.links.push(ResolvedLink {
            source: link.source.clone(),
            destination: link.destination.clone(),
            source_port,
            destination_port,
        });

        if hosts.contains(src) && switches.contains(dst) {
            resolution.host_attachment.attach(src, dst);
        } else if hosts.contains(dst) && switches.contains(src) {
            resolution.host_attachment.attach(dst, src);
        }
    }

    resolution
}

fn next_port<'a>(counters: &mut HashMap<&'a str, u32>, endpoint: &'a str) -> u32 {
    let counter = counters.entry(endpoint).or_insert(1);
    let port = *counter;
    *counter += 1;
    port
}
