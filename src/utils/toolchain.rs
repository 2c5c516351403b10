//! Toolchain path resolution.
//!
//! Switches need three external programs: the `simple_switch` target of the
//! behavioral model, its runtime CLI and the P4 compiler. Their locations are
//! derived from two base directories which may come from the command line,
//! the topology defaults, the environment or built-in fallbacks.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the behavioral model base directory
pub const BMV2_ENV: &str = "BMV2_PATH";
/// Environment variable naming the P4 compiler base directory
pub const P4C_ENV: &str = "P4C_BM_PATH";

pub const DEFAULT_BMV2_DIR: &str = "../bmv2";
pub const DEFAULT_P4C_DIR: &str = "../p4c-bmv2";

/// Suffix appended to a P4 program path to name its compiled JSON
pub const COMPILED_SUFFIX: &str = ".json";

/// Overrides given on the command line. They win over the topology defaults
/// but not over values set on an individual switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolchainOverrides {
    pub p4src: Option<PathBuf>,
    pub bmv2: Option<PathBuf>,
    pub p4c: Option<PathBuf>,
}

/// Base directories taken from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolchainEnv {
    pub bmv2: Option<PathBuf>,
    pub p4c: Option<PathBuf>,
}

impl ToolchainEnv {
    /// Read `BMV2_PATH` and `P4C_BM_PATH`; empty values count as unset.
    pub fn from_env() -> Self {
        ToolchainEnv {
            bmv2: env_path(BMV2_ENV),
            p4c: env_path(P4C_ENV),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `<bmv2>/targets/simple_switch/simple_switch`
pub fn simple_switch_path(bmv2: &Path) -> PathBuf {
    bmv2.join("targets").join("simple_switch").join("simple_switch")
}

/// `<bmv2>/tools/runtime_CLI.py`
pub fn runtime_cli_path(bmv2: &Path) -> PathBuf {
    bmv2.join("tools").join("runtime_CLI.py")
}

/// `<p4c>/p4c_bm/__main__.py`
pub fn compiler_path(p4c: &Path) -> PathBuf {
    p4c.join("p4c_bm").join("__main__.py")
}

/// Compiled artifact for a P4 program: the program path with `.json` appended,
/// so `router.p4` becomes `router.p4.json`.
pub fn compiled_artifact_path(p4src: &Path) -> PathBuf {
    let mut path: OsString = p4src.as_os_str().to_owned();
    path.push(COMPILED_SUFFIX);
    PathBuf::from(path)
}
