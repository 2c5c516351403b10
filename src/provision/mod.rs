//! Provisioning drivers.
//!
//! Everything here runs after resolution and only reads the resolved
//! topology: checking that the toolchain and programs exist, compiling each
//! P4 program, waiting for switches to come up and pushing their rules.

pub mod compiler;
pub mod runtime;
pub mod validation;

pub use compiler::compile_programs;
pub use runtime::{load_all_commands, load_commands, wait_for_port, PortWait};
pub use validation::{check_links, check_switch_paths, validate_topology};

use crate::config::ConfigurationError;
use std::path::PathBuf;

/// Errors raised while provisioning a resolved topology
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("{what} {} for switch {switch} not found", .path.display())]
    MissingFile {
        switch: String,
        what: &'static str,
        path: PathBuf,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compiling {} failed ({status}): {output}", .p4src.display())]
    CompileFailed {
        p4src: PathBuf,
        status: String,
        output: String,
    },

    #[error("cannot open commands file {} for switch {switch}: {source}", .path.display())]
    CommandsFile {
        switch: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("loading rules into switch {switch} failed ({status}): {output}")]
    RulesFailed {
        switch: String,
        status: String,
        output: String,
    },
}
