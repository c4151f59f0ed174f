//! gqlwatch: run GraphQL code generation for the document you just saved.

// The binary talks to the user through the terminal.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod notifier;
mod shutdown;
mod tracing;
mod watcher;

use crate::cli::{Cli, Commands};
use crate::commands::{CommandContext, CommandStatus};
use crate::tracing::TracingConfig;
use std::time::Duration;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    match run().await {
        Ok(CommandStatus::Success) => {}
        Ok(CommandStatus::Failure) => std::process::exit(1),
        Err(error) => {
            eprintln!("{error:?}");
            std::process::exit(1);
        }
    }
}

async fn run() -> miette::Result<CommandStatus> {
    let cli = cli::parse();

    crate::tracing::init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        ..TracingConfig::default()
    })?;

    let context = CommandContext::from_cli(&cli)?;
    execute_command(&cli, &context).await
}

async fn execute_command(cli: &Cli, context: &CommandContext) -> miette::Result<CommandStatus> {
    ::tracing::debug!(
        command = ?cli.command,
        root = %context.root.display(),
        correlation_id = %crate::tracing::correlation_id(),
        "Executing command"
    );

    match &cli.command {
        Commands::Watch { debounce_ms } => {
            commands::watch::execute(context, Duration::from_millis(*debounce_ms)).await?;
            Ok(CommandStatus::Success)
        }
        Commands::Generate => Ok(commands::generate::execute(context).await),
        Commands::Plan { file, output } => {
            commands::plan::execute(context, file, *output).await?;
            Ok(CommandStatus::Success)
        }
        Commands::Locate => {
            commands::locate::execute(context)?;
            Ok(CommandStatus::Success)
        }
    }
}
