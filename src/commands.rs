//! CLI command definitions
//!
//! Defines the clap commands for the test group CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a test group, wait for it to finish and report the results
    Create {
        #[command(flatten)]
        target: InstanceArgs,
    },

    /// Delete the test group recorded for an instance
    Delete {
        #[command(flatten)]
        target: InstanceArgs,
    },

    /// Validate node properties and resolve names without creating anything
    #[command(alias = "creation-validation")]
    Validate {
        /// Path to the YAML node properties
        #[arg(long, short)]
        properties: PathBuf,

        /// Print the resolved test group document
        #[arg(long)]
        show: bool,
    },

    /// Print the runtime state stored for an instance
    ShowState {
        #[command(flatten)]
        instance: StateArgs,
    },
}

/// Node properties plus the instance they belong to
#[derive(Args)]
pub struct InstanceArgs {
    /// Path to the YAML node properties
    #[arg(long, short)]
    pub properties: PathBuf,

    #[command(flatten)]
    pub state: StateArgs,
}

/// Selects the runtime state file of an instance
#[derive(Args)]
pub struct StateArgs {
    /// Instance name; selects the state file in the state directory
    #[arg(long, default_value = "default")]
    pub instance: String,

    /// Explicit runtime state file (overrides --instance)
    #[arg(long)]
    pub state: Option<PathBuf>,
}
