//! CLI command handling
//!
//! Builds the invocation context for a command, runs the lifecycle
//! operation and formats its output.

use colored::Colorize;

use crate::commands::{Commands, StateArgs};
use crate::common::config::Settings;
use crate::common::{paths, Result};
use crate::lifecycle::{self, InvocationContext};
use crate::properties::NodeProperties;
use crate::service::display_id;
use crate::state::RuntimeState;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, settings: Settings) -> Result<()> {
    match command {
        Commands::Create { target } => {
            let properties = NodeProperties::load(&target.properties)?;
            let state = open_state(&target.state, &settings)?;
            let mut ctx = InvocationContext::new(properties, settings, state);

            let report = lifecycle::create(&mut ctx).await?;

            println!(
                "{} Test group {} {}",
                "✓".green(),
                display_id(&report.testgroup_id).bold(),
                report.status.status.green()
            );
            if let Some(results) = &report.results.results {
                println!("{}", serde_json::to_string_pretty(results)?);
            }
            Ok(())
        }

        Commands::Delete { target } => {
            let properties = NodeProperties::load(&target.properties)?;
            let state = open_state(&target.state, &settings)?;
            let mut ctx = InvocationContext::new(properties, settings, state);

            match lifecycle::delete(&mut ctx).await? {
                Some(id) => println!("{} Deleted test group {}", "✓".green(), display_id(&id)),
                None => println!(
                    "No test group recorded for instance '{}'",
                    target.state.instance
                ),
            }
            Ok(())
        }

        Commands::Validate { properties, show } => {
            let properties = NodeProperties::load(&properties)?;
            let ctx = InvocationContext::new(properties, settings, RuntimeState::in_memory());

            let config = lifecycle::creation_validation(&ctx).await?;

            println!(
                "{} Test group '{}' is valid ({} tests)",
                "✓".green(),
                config.name,
                config.tests.len()
            );
            if show {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(())
        }

        Commands::ShowState { instance } => {
            let state = open_state(&instance, &settings)?;
            if let Some(path) = state.path() {
                println!("{}", path.display().to_string().dimmed());
            }
            println!("{}", serde_json::to_string_pretty(state.properties())?);
            Ok(())
        }
    }
}

/// Open the runtime state selected by the CLI arguments
fn open_state(args: &StateArgs, settings: &Settings) -> Result<RuntimeState> {
    let path = match &args.state {
        Some(path) => path.clone(),
        None => paths::instance_state_file(&settings.state.resolve_dir()?, &args.instance),
    };
    RuntimeState::load(path)
}
