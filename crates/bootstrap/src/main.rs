//! Netforge bootstrapper CLI.
//!
//! Bootstrap a local netforge network from a directory of node conf
//! files and application bundles.

use anyhow::Context;
use clap::Parser;
use netforge::{BootstrapOptions, Bootstrapper};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Netforge Network Bootstrapper
#[derive(Parser)]
#[command(name = "netforge")]
#[command(author = "Netforge Contributors")]
#[command(version)]
#[command(about = "Bootstrap a local netforge network from node conf files and application bundles", long_about = None)]
struct Cli {
    /// Root directory containing the node conf files and application
    /// bundles that will form the network. May also contain existing
    /// node directories.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Use the embedded netforge-node binary even when the root
    /// directory provides one
    #[arg(long)]
    embedded_binary: bool,

    /// Don't copy application archives into the nodes' "apps" directories
    #[arg(long)]
    no_copy: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        if cli.verbose {
            eprintln!("error: {:?}", e);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let root = cli
        .dir
        .canonicalize()
        .with_context(|| format!("cannot resolve root directory {}", cli.dir.display()))?;
    let options = BootstrapOptions {
        copy_apps: !cli.no_copy,
        prefer_embedded_binary: cli.embedded_binary,
    };

    let report = Bootstrapper::new().bootstrap(&root, &options)?;

    println!("Bootstrap complete:");
    println!("  Nodes:     {}", report.nodes);
    println!("  Notaries:  {}", report.parameters.notaries.len());
    println!("  Contracts: {}", report.parameters.whitelist.len());
    println!("  Epoch:     {}", report.parameters.epoch);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "trace" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
