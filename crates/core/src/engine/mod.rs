//! Generation engine abstraction.
//!
//! The engine is an external collaborator: it builds a context from a config
//! file and runs generation for it. Hosts hand an [`EngineProvider`] to the
//! session so the engine can be looked up lazily on every trigger. A project
//! that installs the engine mid-session starts working without a restart.
//!
//! [`node::NodeCliEngine`] drives a project-local `@graphql-codegen/cli`.

pub mod node;

pub use node::{NodeCliEngine, NodeEngineProvider};

use crate::Result;
use crate::config::GenerationConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// State the engine generates from: a config plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenContext {
    config_path: PathBuf,
    cwd: PathBuf,
    config: GenerationConfig,
}

impl CodegenContext {
    /// Create a context for `config` loaded from `config_path`.
    ///
    /// The working directory starts out as the config file's directory.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>, config: GenerationConfig) -> Self {
        let config_path = config_path.into();
        let cwd = config_path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        Self {
            config_path,
            cwd,
            config,
        }
    }

    /// Path of the config file this context was built from
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory relative paths are resolved against during generation
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Replace the working directory
    pub fn set_cwd(&mut self, cwd: impl Into<PathBuf>) {
        self.cwd = cwd.into();
    }

    /// Current config
    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Replace the config
    pub fn update_config(&mut self, config: GenerationConfig) {
        self.config = config;
    }
}

/// Trait for code generation engines
#[async_trait]
pub trait CodegenEngine: Send + Sync {
    /// Build a context from the config file at `config_path`
    async fn create_context(&self, config_path: &Path) -> Result<CodegenContext>;

    /// Run generation for `context`
    ///
    /// Failures should be reported as [`crate::Error::Generation`] carrying
    /// the individual error messages when the engine has them.
    async fn generate(&self, context: &CodegenContext) -> Result<()>;

    /// Get the name of the engine
    fn name(&self) -> &'static str;
}

/// Capability lookup for the engine
pub trait EngineProvider: Send + Sync {
    /// Return the engine, or [`crate::Error::DependencyMissing`] if the
    /// project does not have it installed
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot be provided.
    fn engine(&self) -> Result<Arc<dyn CodegenEngine>>;
}
