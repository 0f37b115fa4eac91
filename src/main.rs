//! Netrounds test group CLI
//!
//! Creates, validates and deletes Netrounds test groups described by
//! YAML node properties.

use clap::Parser;
use std::path::PathBuf;
use testgroup::commands::Commands;
use testgroup::common::config::Settings;
use testgroup::common::logging;
use testgroup::{cli, Result};

#[derive(Parser)]
#[command(name = "testgroup", about = "Run Netrounds test groups from node properties")]
#[command(version, long_about = None)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also append the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    cli::dispatch(cli.command, settings).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.log_file.as_deref());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
