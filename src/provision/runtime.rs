//! Switch runtime: readiness polling and rule loading.

use super::ProvisionError;
use crate::topology::{ResolvedTopology, Switch};
use log::{debug, error, info, warn};
use std::fs::File;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Bounded retry policy for waiting on a local TCP port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortWait {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for PortWait {
    fn default() -> Self {
        PortWait {
            retries: 10,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Poll `127.0.0.1:<port>` until it accepts a connection.
///
/// Makes at most `wait.retries` attempts, sleeping `wait.backoff` between
/// them. Returns whether the port became reachable.
pub fn wait_for_port(port: u16, wait: &PortWait) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let timeout = wait.backoff.max(Duration::from_millis(100));

    for attempt in 1..=wait.retries {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            debug!("port {} reachable after {} attempt(s)", port, attempt);
            return true;
        }
        if attempt < wait.retries {
            thread::sleep(wait.backoff);
        }
    }
    false
}

/// Push a switch's rules file through the runtime CLI.
///
/// Runs `<cli> --json <p4json> --thrift-port <port>` with the rules file on
/// stdin once the thrift port is reachable. A switch without a rules file is
/// skipped.
pub fn load_commands(switch: &Switch, wait: &PortWait) -> Result<(), ProvisionError> {
    let Some(commands) = &switch.commands else {
        info!("switch {} has no commands file, skipping rule loading", switch.name);
        return Ok(());
    };

    let rules = File::open(commands).map_err(|source| ProvisionError::CommandsFile {
        switch: switch.name.clone(),
        path: commands.clone(),
        source,
    })?;

    if !wait_for_port(switch.port, wait) {
        warn!(
            "thrift port {} of switch {} not reachable after {} attempts, trying anyway",
            switch.port, switch.name, wait.retries
        );
    }

    let mut cmd = Command::new(&switch.cli);
    cmd.arg("--json")
        .arg(&switch.p4json)
        .arg("--thrift-port")
        .arg(switch.port.to_string())
        .stdin(Stdio::from(rules));
    info!("{:?}", cmd);

    let output = cmd.output().map_err(|source| ProvisionError::Spawn {
        program: switch.cli.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(ProvisionError::RulesFailed {
            switch: switch.name.clone(),
            status: output.status.to_string(),
            output: format!("{}{}", stdout, String::from_utf8_lossy(&output.stderr))
                .trim()
                .to_string(),
        });
    }
    if !stdout.trim().is_empty() {
        info!("{}", stdout.trim());
    }
    Ok(())
}

/// Load rules into every switch. A failing switch is logged and does not
/// stop the others. Returns the number of switches that failed.
pub fn load_all_commands(topology: &ResolvedTopology, wait: &PortWait) -> usize {
    let mut failures = 0;
    for switch in &topology.switches {
        if let Err(e) = load_commands(switch, wait) {
            error!("{}", e);
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn quick() -> PortWait {
        PortWait {
            retries: 2,
            backoff: Duration::from_millis(10),
        }
    }

    fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn switch(dir: &Path, cli: PathBuf, port: u16, commands: Option<PathBuf>) -> Switch {
        Switch {
            name: "s1".to_string(),
            id: 1,
            port,
            p4src: dir.join("router.p4"),
            p4json: dir.join("router.p4.json"),
            sw_path: dir.join("simple_switch"),
            cli,
            compiler: dir.join("p4c"),
            commands,
            dump: true,
            verbose: "info".to_string(),
        }
    }

    #[test]
    fn test_wait_for_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(wait_for_port(port, &quick()));
    }

    #[test]
    fn test_wait_for_closed_port() {
        assert!(!wait_for_port(free_port(), &quick()));
    }

    #[test]
    fn test_load_commands_feeds_rules_on_stdin() {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let args_out = dir.path().join("args.txt");
        let stdin_out = dir.path().join("stdin.txt");
        let cli = dir.path().join("runtime_CLI.py");
        std::fs::write(
            &cli,
            format!(
                "#!/bin/sh\necho \"$@\" > '{}'\ncat > '{}'\n",
                args_out.display(),
                stdin_out.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&cli, std::fs::Permissions::from_mode(0o755)).unwrap();

        let rules = dir.path().join("commands-s1.txt");
        std::fs::write(&rules, "table_set_default fwd drop\n").unwrap();

        let sw = switch(dir.path(), cli, port, Some(rules));
        load_commands(&sw, &quick()).unwrap();

        let args = std::fs::read_to_string(&args_out).unwrap();
        assert_eq!(
            args.trim(),
            format!("--json {} --thrift-port {}", sw.p4json.display(), port)
        );
        assert_eq!(
            std::fs::read_to_string(&stdin_out).unwrap(),
            "table_set_default fwd drop\n"
        );
    }

    #[test]
    fn test_switch_without_commands_is_skipped() {
        let dir = TempDir::new().unwrap();
        let sw = switch(dir.path(), dir.path().join("missing-cli"), free_port(), None);
        assert!(load_commands(&sw, &quick()).is_ok());
    }

    #[test]
    fn test_missing_commands_file() {
        let dir = TempDir::new().unwrap();
        let sw = switch(
            dir.path(),
            dir.path().join("missing-cli"),
            free_port(),
            Some(dir.path().join("nope.txt")),
        );
        let err = load_commands(&sw, &quick()).unwrap_err();
        assert!(matches!(err, ProvisionError::CommandsFile { .. }));
    }
}
