use crate::config::{ConfigurationError, TopologyDocument};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Errors raised while reading a topology file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot load given topology file {}: not found", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read topology file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse topology file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("topology file {} is empty", .0.display())]
    Empty(PathBuf),
}

/// Any error that aborts topology loading or resolution
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Load and parse a topology descriptor from a YAML file
pub fn load_topology(topology_path: &Path) -> Result<TopologyDocument, TopologyError> {
    info!("Loading topology from: {:?}", topology_path);

    // Check the topology file exists
    if !topology_path.is_file() {
        return Err(LoadError::NotFound(topology_path.to_path_buf()).into());
    }

    // Read the topology file
    let content = std::fs::read_to_string(topology_path).map_err(|source| LoadError::Io {
        path: topology_path.to_path_buf(),
        source,
    })?;

    // Parse the YAML content
    let document = parse_topology(&content).map_err(|e| match e {
        ParseFailure::Empty => LoadError::Empty(topology_path.to_path_buf()),
        ParseFailure::Yaml(source) => LoadError::Parse {
            path: topology_path.to_path_buf(),
            source,
        },
    })?;

    // Validate the topology before any host is touched
    document.validate()?;

    info!(
        "Loaded topology with {} hosts, {} switches, {} links",
        document.hosts().len(),
        document.switches().len(),
        document.links().len()
    );

    Ok(document)
}

enum ParseFailure {
    Empty,
    Yaml(serde_yaml::Error),
}

fn parse_topology(content: &str) -> Result<TopologyDocument, ParseFailure> {
    if content.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(ParseFailure::Yaml)?;
    if value.is_null() {
        return Err(ParseFailure::Empty);
    }
    debug!("Parsed topology document root");

    serde_yaml::from_value(value).map_err(ParseFailure::Yaml)
}
