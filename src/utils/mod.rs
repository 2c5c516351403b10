//! Shared utilities: toolchain path resolution.

pub mod toolchain;

pub use toolchain::{compiled_artifact_path, ToolchainEnv, ToolchainOverrides};
