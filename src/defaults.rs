//! Default-merge engine.
//!
//! Fills every unset field of a host or switch entry. For each field the
//! first source that has a value wins:
//!
//! 1. the entity itself
//! 2. command-line overrides (`p4src`, `bmv2`, `p4c` only)
//! 3. the `defaults` section for the entity kind
//! 4. the environment (`BMV2_PATH`, `P4C_BM_PATH` only)
//! 5. a built-in constant
//!
//! Fields without any sensible fallback, such as a host `ip` or a switch
//! `p4src`, are left unset here and rejected when the resolved record is
//! built. Merging into an entity that already has every field set is a no-op.

use crate::config::{HostDefaults, HostSpec, SwitchDefaults, SwitchSpec};
use crate::utils::toolchain::{
    compiler_path, runtime_cli_path, simple_switch_path, ToolchainEnv, ToolchainOverrides,
    DEFAULT_BMV2_DIR, DEFAULT_P4C_DIR,
};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// First thrift port handed out when the defaults do not name one
pub const DEFAULT_THRIFT_PORT: u16 = 22222;
pub const DEFAULT_VERBOSITY: &str = "info";
pub const DEFAULT_PCAP_DUMP: bool = true;

/// Fill unset host fields from the host defaults
pub fn merge_host_defaults(host: &mut HostSpec, defaults: &HostDefaults) {
    if host.gw.is_none() {
        host.gw = defaults.gw.clone();
    }
    if host.command.is_none() {
        host.command = Some(defaults.command.clone().unwrap_or_default());
    }
}

/// Conventional per-switch rules file name
pub fn conventional_commands_file(switch_name: &str) -> String {
    format!("commands-{}.txt", switch_name)
}

/// Two switches ended up on the same thrift port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortClash {
    pub switch: String,
    pub port: u16,
    /// Switch that got the port first
    pub owner: String,
}

/// Switch defaults with every fallback already applied, plus the running
/// thrift port counter.
///
/// One `SwitchMerge` is used for all switches of a document, in declaration
/// order. The port counter advances once per switch whether or not that
/// switch pins its own port. Ports already handed out are tracked so that a
/// pinned port landing on a taken one is reported.
#[derive(Debug, Clone)]
pub struct SwitchMerge {
    p4src: Option<PathBuf>,
    bmv2: PathBuf,
    p4c: PathBuf,
    dump: bool,
    verbose: String,
    commands: Option<PathBuf>,
    next_port: u16,
    port_owners: BTreeMap<u16, String>,
    port_clashes: Vec<PortClash>,
    workdir: PathBuf,
}

impl SwitchMerge {
    /// `workdir` is where conventional `commands-<name>.txt` files are looked up.
    pub fn new(
        defaults: &SwitchDefaults,
        overrides: &ToolchainOverrides,
        env: &ToolchainEnv,
        workdir: &Path,
    ) -> Self {
        let bmv2 = first_path(&[&overrides.bmv2, &defaults.bmv2, &env.bmv2])
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BMV2_DIR));
        let p4c = first_path(&[&overrides.p4c, &defaults.p4c, &env.p4c])
            .unwrap_or_else(|| PathBuf::from(DEFAULT_P4C_DIR));

        SwitchMerge {
            p4src: first_path(&[&overrides.p4src, &defaults.p4src]),
            bmv2,
            p4c,
            dump: defaults.dump.unwrap_or(DEFAULT_PCAP_DUMP),
            verbose: defaults
                .verbose
                .clone()
                .unwrap_or_else(|| DEFAULT_VERBOSITY.to_string()),
            commands: defaults.commands.clone(),
            next_port: defaults.port.unwrap_or(DEFAULT_THRIFT_PORT),
            port_owners: BTreeMap::new(),
            port_clashes: Vec::new(),
            workdir: workdir.to_path_buf(),
        }
    }

    /// The port the next switch without an explicit port will get
    pub fn next_port(&self) -> u16 {
        self.next_port
    }

    /// Thrift ports given to more than one switch so far
    pub fn port_clashes(&self) -> &[PortClash] {
        &self.port_clashes
    }

    /// Fill unset fields of `switch` and advance the port counter.
    pub fn apply(&mut self, switch: &mut SwitchSpec) {
        let bmv2 = switch.bmv2.get_or_insert_with(|| self.bmv2.clone()).clone();
        if switch.sw_path.is_none() {
            switch.sw_path = Some(simple_switch_path(&bmv2));
        }
        if switch.cli.is_none() {
            switch.cli = Some(runtime_cli_path(&bmv2));
        }

        let p4c = switch.p4c.get_or_insert_with(|| self.p4c.clone()).clone();
        if switch.compiler.is_none() {
            switch.compiler = Some(compiler_path(&p4c));
        }

        if switch.p4src.is_none() {
            switch.p4src = self.p4src.clone();
        }
        let port = *switch.port.get_or_insert(self.next_port);
        self.record_port(&switch.name, port);
        if switch.dump.is_none() {
            switch.dump = Some(self.dump);
        }
        if switch.verbose.is_none() {
            switch.verbose = Some(self.verbose.clone());
        }
        if switch.commands.is_none() {
            switch.commands = self.commands_for(&switch.name);
        }

        debug!(
            "switch {}: port {:?}, p4src {:?}, commands {:?}",
            switch.name, switch.port, switch.p4src, switch.commands
        );

        match self.next_port.checked_add(1) {
            Some(port) => self.next_port = port,
            None => warn!("thrift port counter reached {}, not advancing", self.next_port),
        }
    }

    /// Remember which switch owns `port`. The first owner keeps it; later
    /// switches on the same port are logged and recorded as clashes.
    fn record_port(&mut self, switch_name: &str, port: u16) {
        match self.port_owners.get(&port) {
            Some(owner) => {
                warn!(
                    "switch {} thrift port {} already used by {}",
                    switch_name, port, owner
                );
                self.port_clashes.push(PortClash {
                    switch: switch_name.to_string(),
                    port,
                    owner: owner.clone(),
                });
            }
            None => {
                self.port_owners.insert(port, switch_name.to_string());
            }
        }
    }

    /// The conventional rules file if it exists right now, else the default.
    fn commands_for(&self, switch_name: &str) -> Option<PathBuf> {
        let conventional = self.workdir.join(conventional_commands_file(switch_name));
        if conventional.is_file() {
            Some(conventional)
        } else {
            self.commands.clone()
        }
    }
}

fn first_path(candidates: &[&Option<PathBuf>]) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| (*candidate).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn switch(name: &str) -> SwitchSpec {
        SwitchSpec {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn merger(defaults: &SwitchDefaults, workdir: &Path) -> SwitchMerge {
        SwitchMerge::new(
            defaults,
            &ToolchainOverrides::default(),
            &ToolchainEnv::default(),
            workdir,
        )
    }

    #[test]
    fn test_host_defaults() {
        let defaults = HostDefaults {
            gw: Some("10.0.0.254".to_string()),
            command: Some(vec!["arp -s 10.0.0.254 00:aa:bb:00:00:01".to_string()]),
        };

        let mut host = HostSpec {
            name: "h1".to_string(),
            ..Default::default()
        };
        merge_host_defaults(&mut host, &defaults);
        assert_eq!(host.gw.as_deref(), Some("10.0.0.254"));
        assert_eq!(host.command.as_ref().map(Vec::len), Some(1));

        let mut explicit = HostSpec {
            name: "h2".to_string(),
            gw: Some("10.0.1.254".to_string()),
            command: Some(vec![]),
            ..Default::default()
        };
        merge_host_defaults(&mut explicit, &defaults);
        assert_eq!(explicit.gw.as_deref(), Some("10.0.1.254"));
        assert_eq!(explicit.command, Some(vec![]));
    }

    #[test]
    fn test_host_builtin_defaults() {
        let mut host = HostSpec {
            name: "h1".to_string(),
            ..Default::default()
        };
        merge_host_defaults(&mut host, &HostDefaults::default());
        assert_eq!(host.gw, None);
        assert_eq!(host.command, Some(vec![]));
        assert_eq!(host.ip, None);
    }

    #[test]
    fn test_switch_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        let mut merge = merger(&SwitchDefaults::default(), dir.path());

        let mut s1 = switch("s1");
        merge.apply(&mut s1);

        assert_eq!(s1.port, Some(DEFAULT_THRIFT_PORT));
        assert_eq!(s1.dump, Some(true));
        assert_eq!(s1.verbose.as_deref(), Some("info"));
        assert_eq!(s1.bmv2, Some(PathBuf::from(DEFAULT_BMV2_DIR)));
        assert_eq!(
            s1.sw_path,
            Some(PathBuf::from("../bmv2/targets/simple_switch/simple_switch"))
        );
        assert_eq!(s1.cli, Some(PathBuf::from("../bmv2/tools/runtime_CLI.py")));
        assert_eq!(s1.compiler, Some(PathBuf::from("../p4c-bmv2/p4c_bm/__main__.py")));
        assert_eq!(s1.p4src, None);
        assert_eq!(s1.commands, None);
    }

    #[test]
    fn test_port_counter_is_contiguous() {
        let dir = TempDir::new().unwrap();
        let defaults = SwitchDefaults {
            port: Some(9090),
            ..Default::default()
        };
        let mut merge = merger(&defaults, dir.path());

        let ports: Vec<u16> = ["s1", "s2", "s3"]
            .iter()
            .map(|name| {
                let mut sw = switch(name);
                merge.apply(&mut sw);
                sw.port.unwrap()
            })
            .collect();
        assert_eq!(ports, vec![9090, 9091, 9092]);
    }

    #[test]
    fn test_explicit_port_still_advances_counter() {
        let dir = TempDir::new().unwrap();
        let mut merge = merger(&SwitchDefaults::default(), dir.path());

        let mut s1 = switch("s1");
        let mut s2 = SwitchSpec {
            port: Some(40000),
            ..switch("s2")
        };
        let mut s3 = switch("s3");
        merge.apply(&mut s1);
        merge.apply(&mut s2);
        merge.apply(&mut s3);

        assert_eq!(s1.port, Some(22222));
        assert_eq!(s2.port, Some(40000));
        assert_eq!(s3.port, Some(22224));
        assert!(merge.port_clashes().is_empty());
    }

    #[test]
    fn test_pinned_port_on_counter_port_is_reported() {
        let dir = TempDir::new().unwrap();
        let defaults = SwitchDefaults {
            p4src: Some(PathBuf::from("a.p4")),
            ..Default::default()
        };
        let mut merge = merger(&defaults, dir.path());

        let mut s1 = switch("s1");
        let mut s2 = SwitchSpec {
            port: Some(22222),
            ..switch("s2")
        };
        let mut s3 = switch("s3");
        merge.apply(&mut s1);
        merge.apply(&mut s2);
        merge.apply(&mut s3);

        // the counter rule is unchanged, the clash is only reported
        assert_eq!(s1.port, Some(22222));
        assert_eq!(s2.port, Some(22222));
        assert_eq!(s3.port, Some(22224));
        assert_eq!(
            merge.port_clashes(),
            &[PortClash {
                switch: "s2".to_string(),
                port: 22222,
                owner: "s1".to_string(),
            }]
        );
    }

    #[test]
    fn test_priority_order() {
        let dir = TempDir::new().unwrap();
        let defaults = SwitchDefaults {
            p4src: Some(PathBuf::from("defaults.p4")),
            bmv2: Some(PathBuf::from("/defaults/bmv2")),
            ..Default::default()
        };
        let overrides = ToolchainOverrides {
            p4src: Some(PathBuf::from("cli.p4")),
            ..Default::default()
        };
        let env = ToolchainEnv {
            bmv2: Some(PathBuf::from("/env/bmv2")),
            p4c: Some(PathBuf::from("/env/p4c")),
        };
        let mut merge = SwitchMerge::new(&defaults, &overrides, &env, dir.path());

        let mut s1 = switch("s1");
        let mut s2 = SwitchSpec {
            p4src: Some(PathBuf::from("own.p4")),
            bmv2: Some(PathBuf::from("/own/bmv2")),
            ..switch("s2")
        };
        merge.apply(&mut s1);
        merge.apply(&mut s2);

        // command line beats defaults, defaults beat the environment
        assert_eq!(s1.p4src, Some(PathBuf::from("cli.p4")));
        assert_eq!(s1.bmv2, Some(PathBuf::from("/defaults/bmv2")));
        assert_eq!(s1.p4c, Some(PathBuf::from("/env/p4c")));

        // the entity beats everything, derived paths follow its base dir
        assert_eq!(s2.p4src, Some(PathBuf::from("own.p4")));
        assert_eq!(s2.cli, Some(PathBuf::from("/own/bmv2/tools/runtime_CLI.py")));
    }

    #[test]
    fn test_conventional_commands_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("commands-s1.txt"),
            "table_add fwd forward 1 => 2\n",
        )
        .unwrap();

        let defaults = SwitchDefaults {
            commands: Some(PathBuf::from("shared-commands.txt")),
            ..Default::default()
        };
        let mut merge = merger(&defaults, dir.path());

        let mut s1 = switch("s1");
        let mut s2 = switch("s2");
        merge.apply(&mut s1);
        merge.apply(&mut s2);

        assert_eq!(s1.commands, Some(dir.path().join("commands-s1.txt")));
        assert_eq!(s2.commands, Some(PathBuf::from("shared-commands.txt")));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let defaults = SwitchDefaults {
            p4src: Some(PathBuf::from("router.p4")),
            ..Default::default()
        };

        let mut merge = merger(&defaults, dir.path());
        let mut sw = switch("s1");
        merge.apply(&mut sw);
        let once = sw.clone();

        let mut again = merger(&SwitchDefaults::default(), dir.path());
        again.apply(&mut sw);
        assert_eq!(sw, once);

        let host_defaults = HostDefaults {
            gw: Some("10.0.0.1".to_string()),
            command: None,
        };
        let mut host = HostSpec {
            name: "h1".to_string(),
            ..Default::default()
        };
        merge_host_defaults(&mut host, &host_defaults);
        let once = host.clone();
        merge_host_defaults(&mut host, &HostDefaults::default());
        assert_eq!(host, once);
    }
}
