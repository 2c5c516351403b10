use super::ProvisionError;
use crate::topology::Switch;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

/// Compile every distinct P4 program used by `switches`.
///
/// Runs `<compiler> <p4src> --json <p4json>` once per program, using the
/// compiler of the first switch that references it. Returns the compiled
/// artifact for each program.
pub fn compile_programs(
    switches: &[Switch],
) -> Result<BTreeMap<PathBuf, PathBuf>, ProvisionError> {
    let mut compiled = BTreeMap::new();

    for switch in switches {
        if compiled.contains_key(&switch.p4src) {
            debug!("{:?} already compiled, reusing for {}", switch.p4src, switch.name);
            continue;
        }

        info!("Compiling source {:?}", switch.p4src);
        let mut cmd = Command::new(&switch.compiler);
        cmd.arg(&switch.p4src).arg("--json").arg(&switch.p4json);
        debug!("{:?}", cmd);

        let output = cmd.output().map_err(|source| ProvisionError::Spawn {
            program: switch.compiler.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ProvisionError::CompileFailed {
                p4src: switch.p4src.clone(),
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }
        if !stdout.trim().is_empty() {
            info!("{}", stdout.trim());
        }

        compiled.insert(switch.p4src.clone(), switch.p4json.clone());
    }

    info!("Compiled {} P4 programs", compiled.len());
    Ok(compiled)
}
