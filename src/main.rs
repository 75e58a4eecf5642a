mod config;
mod error;
mod executor;
mod guid;
mod inventory;
mod matcher;
mod model;
mod query;
mod shell;
mod similarity;
mod sources;

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use crate::config::load_config;
use crate::executor::SystemLauncher;
use crate::matcher::FuzzyMatcher;
use crate::model::Inventory;
use crate::shell::Shell;
use crate::sources::snapshot::SnapshotStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the program to uninstall
    query: Option<String>,

    /// Also consider hotfixes and other updates
    #[arg(long)]
    include_updates: bool,

    /// Read installation records from a JSON snapshot instead of the registry
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Print every installed program and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout());

    let query = args.query.clone().unwrap_or_default();
    if query.is_empty() && !args.list {
        return shell.print_usage();
    }

    // 1. Load Config
    let config = load_config()?;
    let include_updates = args.include_updates || config.general.include_updates;

    // 2. Build Inventory
    let inventory = match &args.snapshot {
        Some(path) => inventory::build(&SnapshotStore::load(path)?, include_updates),
        None => live_inventory(include_updates),
    };
    if inventory.is_empty() {
        log::warn!("No installed programs found");
    }

    if args.list {
        return shell.list(&inventory);
    }

    // 3. Match, pick, dispatch
    let term = query::normalize(&query);
    let matcher = FuzzyMatcher::new(config.matching.tolerance);
    shell.run(&inventory, &term, &matcher, &SystemLauncher, &config.uninstall)
}

#[cfg(windows)]
fn live_inventory(include_updates: bool) -> Inventory {
    inventory::build(&sources::registry::WindowsRegistry, include_updates)
}

#[cfg(not(windows))]
fn live_inventory(_include_updates: bool) -> Inventory {
    log::warn!("No installation record store on this platform; use --snapshot");
    Inventory::new()
}
