//! # gqlwatch-core
//!
//! Config resolution and per-save document partitioning for running
//! GraphQL code generation whenever a document file is saved.
//!
//! The crate does not generate code itself. It decides, for one saved file
//! and one (possibly multi-artifact) codegen configuration, which artifacts
//! have to regenerate and with which inputs, then hands the prepared
//! configuration to a [`engine::CodegenEngine`].
//!
//! ## Flow
//!
//! 1. [`settings::Settings::should_generate_for`] gates the saved file.
//! 2. [`session::Session::load`] locates the config ([`locator`]), asks the
//!    engine for a context and makes every path in it absolute ([`paths`],
//!    [`schema`], [`config`]). The result is cached for the session.
//! 3. [`partition::partition_documents`] narrows each artifact's documents
//!    to the saved file, or to nothing when its original globs do not match.
//! 4. [`trigger::run_generation`] runs the engine and turns the outcome into
//!    exactly one [`notifier::Notification`].
//!
//! [`service::CodegenService`] wires these steps together for a host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod locator;
pub mod notifier;
pub mod partition;
pub mod paths;
pub mod schema;
pub mod service;
pub mod session;
pub mod settings;
pub mod testing;
pub mod trigger;

pub use config::{ArtifactSettings, Documents, GenerationConfig, Generates, OriginalDocuments};
pub use engine::{CodegenContext, CodegenEngine, EngineProvider};
pub use notifier::{Notification, NotificationLevel, Notifier};
pub use service::CodegenService;
pub use session::{CachedContext, Session, SessionOptions, SessionState};
pub use settings::Settings;

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by the generation engine.
///
/// Engines may attach a list of individual error messages (one per failed
/// document or plugin); hosts show the count and the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    /// Summary message for the whole run
    pub message: String,
    /// Individual error messages, in the order the engine reported them
    pub errors: Vec<String>,
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Main error type for gqlwatch operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The generation engine is not installed in the project
    #[error("could not find '{}'", location.display())]
    #[diagnostic(
        code(gqlwatch::engine::missing),
        help("Install @graphql-codegen/cli in the project (e.g. 'npm install -D @graphql-codegen/cli')")
    )]
    DependencyMissing {
        /// Where the engine was expected
        location: PathBuf,
    },

    /// No config file matched any of the conventional names
    #[error("No codegen config found in {} (looked for {})", root.display(), candidates.join(", "))]
    #[diagnostic(
        code(gqlwatch::config::not_found),
        help("Create a codegen.yml in the project root or set 'graphql-codegen.configFilePath'")
    )]
    ConfigNotFound {
        /// Directory that was searched
        root: PathBuf,
        /// Candidate file names, in priority order
        candidates: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(gqlwatch::config::invalid))]
    Configuration {
        /// The error message describing the configuration issue
        message: String,
    },

    /// I/O error with path context
    #[error("I/O error during {operation}: {source}")]
    #[diagnostic(code(gqlwatch::io::error))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// The path where the I/O error occurred, if applicable
        path: Option<Box<Path>>,
        /// Description of the operation that failed
        operation: String,
    },

    /// JSON parse or serialization error
    #[error("JSON error in {}: {source}", path.display())]
    #[diagnostic(code(gqlwatch::config::json))]
    Json {
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
        /// File being read or written
        path: PathBuf,
    },

    /// YAML parse error
    #[error("YAML error in {}: {source}", path.display())]
    #[diagnostic(code(gqlwatch::config::yaml))]
    Yaml {
        /// The underlying serde error
        #[source]
        source: serde_yaml::Error,
        /// File being read
        path: PathBuf,
    },

    /// Invalid glob pattern in documents or settings
    #[error("Invalid glob pattern '{pattern}': {source}")]
    #[diagnostic(code(gqlwatch::glob::invalid))]
    Glob {
        /// The offending pattern
        pattern: String,
        /// The underlying globset error
        #[source]
        source: globset::Error,
    },

    /// The engine's generate operation failed
    #[error("{0}")]
    #[diagnostic(code(gqlwatch::generate::failed))]
    Generation(GenerationFailure),

    /// Loading the codegen context failed
    ///
    /// Wraps the shared error so every caller awaiting the same in-flight
    /// load receives it.
    #[error("Failed to load codegen context: {source}")]
    #[diagnostic(code(gqlwatch::session::load_failed))]
    Load {
        /// The error produced by the load
        #[source]
        source: Arc<Error>,
    },

    /// The operation was cancelled by the host
    #[error("Operation cancelled")]
    #[diagnostic(code(gqlwatch::cancelled))]
    Cancelled,
}

impl Error {
    /// Create a configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(source: std::io::Error, path: Option<PathBuf>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.map(PathBuf::into_boxed_path),
            operation: operation.into(),
        }
    }

    /// Create a generation failure carrying individual error messages
    pub fn generation(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Generation(GenerationFailure {
            message: message.into(),
            errors,
        })
    }

    /// Create a glob error for `pattern`
    pub fn glob(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::Glob {
            pattern: pattern.into(),
            source,
        }
    }
}

/// Result type alias for gqlwatch operations
pub type Result<T> = std::result::Result<T, Error>;
