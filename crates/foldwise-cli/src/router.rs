//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, TasksAction};
use crate::commands;
use crate::console::CliConsole;
use crate::logging;
use foldwise_core::config::{Config, load_config};
use foldwise_core::error::FoldwiseResult;
use foldwise_sdk::FoldwiseSdk;
use std::collections::HashMap;

/// Config from file, environment and the global flags, in that order
fn load(cli: &Cli) -> FoldwiseResult<Config> {
    let mut overrides = HashMap::new();
    if let Some(server) = &cli.server {
        overrides.insert("server".to_string(), server.clone());
    }
    if let Some(api_key) = &cli.api_key {
        overrides.insert("api_key".to_string(), api_key.clone());
    }
    load_config(cli.config_file.as_deref(), overrides)
}

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> FoldwiseResult<()> {
    let mut console = CliConsole::new(cli.verbose);

    // init must work even when the existing config is broken
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        let path = commands::config::target_path(cli.config_file.as_deref())?;
        return commands::config::init(&path, *force, &console).await;
    }

    let config = load(&cli)?;
    logging::init(&config.logging, cli.verbose);
    tracing::debug!(server = %config.server, "starting");

    match cli.command {
        Commands::Config { .. } => {
            commands::config::show(&config, &console);
            Ok(())
        }
        Commands::Runs { action } => {
            let sdk = FoldwiseSdk::with_config(config)?;
            commands::runs::handle(&sdk, action, &console).await
        }
        Commands::Tasks {
            action: TasksAction::Get { id },
        } => {
            let sdk = FoldwiseSdk::with_config(config)?;
            commands::tasks::get(&sdk, id, &mut console).await
        }
        Commands::Run(args) => {
            let sdk = FoldwiseSdk::with_config(config)?;
            commands::run::execute(sdk, args, &mut console).await
        }
    }
}
