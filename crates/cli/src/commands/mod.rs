pub mod generate;
pub mod locate;
pub mod plan;
pub mod watch;

use crate::cli::Cli;
use gqlwatch_core::engine::NodeEngineProvider;
use gqlwatch_core::{CodegenService, Notifier, Session, Settings};
use miette::IntoDiagnostic;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of a command, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
}

/// Project root and effective settings shared by all commands
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub root: PathBuf,
    pub settings: Settings,
    pub node: String,
}

impl CommandContext {
    /// Resolve the project root and layer CLI flags over its settings file
    pub fn from_cli(cli: &Cli) -> miette::Result<Self> {
        let root = std::fs::canonicalize(&cli.root)
            .into_diagnostic()
            .map_err(|e| e.wrap_err(format!("Invalid project root {}", cli.root.display())))?;
        let mut settings = Settings::load(&root)?;
        cli.apply_overrides(&mut settings);
        tracing::debug!(root = %root.display(), ?settings, "Resolved command context");
        Ok(Self {
            root,
            settings,
            node: cli.node.clone(),
        })
    }

    /// Build a service using the project's own codegen CLI
    pub fn service(&self, notifier: Arc<dyn Notifier>) -> CodegenService {
        let session = Arc::new(Session::new(
            &self.root,
            self.settings.session_options(),
            Arc::new(NodeEngineProvider::new(&self.root).with_node_binary(&self.node)),
        ));
        CodegenService::new(session, self.settings.clone(), notifier)
    }
}
