use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use minip4::utils::ToolchainOverrides;
use minip4::{config_loader, orchestrator, plan, provision};

/// Topology provisioning utility for P4 software switches in Mininet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology YAML file
    #[arg(short, long, default_value = "p4-topo.yml")]
    topology: PathBuf,

    /// Path to the default P4 source file
    #[arg(short = 's', long)]
    p4src: Option<PathBuf>,

    /// Path to the behavioral model base folder
    #[arg(short, long)]
    bmv2: Option<PathBuf>,

    /// Path to the P4 compiler base folder
    #[arg(short = 'c', long)]
    p4c: Option<PathBuf>,

    /// Output path for the emulator plan (.yaml or .json)
    #[arg(short, long, default_value = "p4-topo.plan.yaml")]
    output: PathBuf,

    /// Only resolve the topology and write the plan
    #[arg(long, conflicts_with = "load_rules")]
    resolve_only: bool,

    /// After writing the plan, wait for each switch and load its rules
    #[arg(long)]
    load_rules: bool,

    /// Connection attempts per switch thrift port
    #[arg(long, default_value_t = 10)]
    port_retries: u32,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting MiniP4");
    info!("Topology file: {:?}", args.topology);

    let document = config_loader::load_topology(&args.topology)
        .wrap_err_with(|| format!("Failed to load topology '{}'", args.topology.display()))?;

    let overrides = ToolchainOverrides {
        p4src: args.p4src.clone(),
        bmv2: args.bmv2.clone(),
        p4c: args.p4c.clone(),
    };
    let options = orchestrator::ResolveOptions::from_env(overrides);
    let topology = orchestrator::resolve_topology(document, &options)
        .wrap_err("Failed to resolve topology")?;

    if !args.resolve_only {
        provision::validate_topology(&topology)?;
        provision::compile_programs(&topology.switches)?;
    }

    plan::write_plan(&topology, &args.output)?;

    if args.load_rules {
        let wait = provision::PortWait {
            retries: args.port_retries,
            backoff: Duration::from_secs(1),
        };
        let failures = provision::load_all_commands(&topology, &wait);
        if failures > 0 {
            bail!("Loading rules failed for {} switch(es)", failures);
        }
    }

    info!("Topology provisioning completed successfully");
    Ok(())
}
