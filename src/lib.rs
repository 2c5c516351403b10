//! # MiniP4 - Topology provisioning for P4 software switches in Mininet
//!
//! This library turns a short YAML description of hosts, switches and links
//! into a fully resolved network: every host gets a unique MAC, every switch
//! a unique device id and thrift port, every link end a port number, and
//! every unset field a value from the defaults.
//!
//! ## Architecture
//!
//! - `config`: Topology descriptor types and structural validation
//! - `config_loader`: Reading descriptor files
//! - `defaults`: Default-merge engine for hosts and switches
//! - `identity`: MAC and device id allocation
//! - `topology`: Resolved records, port numbering and host attachment
//! - `orchestrator`: The resolution pipeline
//! - `plan`: Emulator plan generation
//! - `provision`: Path checks, P4 compilation and rule loading
//! - `utils`: Toolchain path helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use minip4::{config_loader, orchestrator, plan};
//! use minip4::utils::ToolchainOverrides;
//! use std::path::Path;
//!
//! let document = config_loader::load_topology(Path::new("p4-topo.yml"))?;
//! let options = orchestrator::ResolveOptions::from_env(ToolchainOverrides::default());
//! let topology = orchestrator::resolve_topology(document, &options)?;
//!
//! plan::write_plan(&topology, Path::new("p4-topo.plan.yaml"))?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Topology Format
//!
//! ```yaml
//! defaults:
//!   host:
//!     gw: 10.0.0.254
//!   switch:
//!     p4src: router.p4
//!     port: 22222
//!
//! host:
//!   - name: h1
//!     ip: 10.0.1.1
//!   - name: h2
//!     ip: 10.0.2.1
//!
//! switch:
//!   - name: s1
//!   - name: s2
//!
//! link:
//!   - source: h1
//!     destination: s1
//!   - source: h2
//!     destination: s2
//!   - source: s1
//!     destination: s2
//! ```
//!
//! ## Error Handling
//!
//! Loading and resolution return typed errors (`LoadError`,
//! `ConfigurationError`) naming the offending entity. Provisioning and the
//! binary report through `color_eyre`.

pub mod config;
pub mod config_loader;
pub mod defaults;
pub mod identity;
pub mod orchestrator;
pub mod plan;
pub mod provision;
pub mod topology;
pub mod utils;
