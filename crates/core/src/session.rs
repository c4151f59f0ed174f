//! Session-scoped codegen context cache.
//!
//! The context is loaded lazily on the first trigger and reused for every
//! later save until the session is cleared. Loads are single-flight: callers
//! arriving while a load is in progress await the same future, so the engine
//! builds at most one context at a time.
//!
//! ```text
//! UNINITIALIZED ──load──▶ LOADING ──ok──▶ READY
//!       ▲                   │  ▲
//!       │                   err │ load
//!       │                   ▼  │
//!       └──── clear ────── FAILED
//! ```

use crate::config::OriginalDocuments;
use crate::engine::{CodegenContext, CodegenEngine, EngineProvider};
use crate::locator::{ConfigLocator, DEFAULT_MODULE_NAME};
use crate::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type LoadOutcome = std::result::Result<Arc<CachedContext>, Arc<Error>>;
type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

/// How the session finds its config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Explicit config path, relative to the project root or absolute
    pub config_file_path: Option<String>,
    /// Module name used to derive candidate config file names
    pub module_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            config_file_path: None,
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

/// Observable state of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet, or cleared
    Uninitialized,
    /// A load is in progress
    Loading,
    /// A context is cached
    Ready,
    /// The last load failed; the next trigger retries
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Loading => "LOADING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// A loaded context with everything needed to partition and generate
pub struct CachedContext {
    project_root: PathBuf,
    engine: Arc<dyn CodegenEngine>,
    context: tokio::sync::Mutex<CodegenContext>,
    original: OriginalDocuments,
}

impl CachedContext {
    /// Project root the context was loaded for
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Engine that built the context
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn CodegenEngine> {
        &self.engine
    }

    /// The engine context. Holding the lock serializes save handling.
    #[must_use]
    pub const fn context(&self) -> &tokio::sync::Mutex<CodegenContext> {
        &self.context
    }

    /// Document patterns as written in the config
    #[must_use]
    pub const fn original(&self) -> &OriginalDocuments {
        &self.original
    }
}

impl fmt::Debug for CachedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedContext")
            .field("project_root", &self.project_root)
            .field("engine", &self.engine.name())
            .field("original", &self.original)
            .finish_non_exhaustive()
    }
}

enum Phase {
    Uninitialized,
    Loading(SharedLoad),
    Ready(Arc<CachedContext>),
    Failed,
}

/// Lazily loaded, cached codegen state for one project root
pub struct Session {
    project_root: PathBuf,
    options: SessionOptions,
    provider: Arc<dyn EngineProvider>,
    phase: Mutex<Phase>,
}

impl Session {
    /// Create an uninitialized session for `project_root`
    #[must_use]
    pub fn new(
        project_root: impl Into<PathBuf>,
        options: SessionOptions,
        provider: Arc<dyn EngineProvider>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            options,
            provider,
            phase: Mutex::new(Phase::Uninitialized),
        }
    }

    /// Project root of this session
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Options the session was created with
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        match &*self.phase.lock() {
            Phase::Uninitialized => SessionState::Uninitialized,
            Phase::Loading(_) => SessionState::Loading,
            Phase::Ready(_) => SessionState::Ready,
            Phase::Failed => SessionState::Failed,
        }
    }

    /// Return the cached context, loading it first if needed.
    ///
    /// The engine is looked up on every call; when it is missing the state
    /// is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DependencyMissing`] if the engine is not installed,
    /// or [`Error::Load`] if locating, reading or preparing the config
    /// failed. Every caller awaiting the same load receives the same error.
    pub async fn load(&self) -> Result<Arc<CachedContext>> {
        let engine = self.provider.engine()?;

        let load = {
            let mut phase = self.phase.lock();
            match &*phase {
                Phase::Ready(cached) => return Ok(Arc::clone(cached)),
                Phase::Loading(in_flight) => {
                    tracing::debug!("Awaiting in-flight codegen context load");
                    in_flight.clone()
                }
                Phase::Uninitialized | Phase::Failed => {
                    let load = self.start_load(engine);
                    *phase = Phase::Loading(load.clone());
                    load
                }
            }
        };

        let outcome = load.clone().await;
        self.settle(&load, &outcome);
        outcome.map_err(|source| Error::Load { source })
    }

    /// Drop the cached context and return to `UNINITIALIZED`.
    ///
    /// A load still in flight finishes for its callers but is not cached.
    pub fn clear(&self) {
        let mut phase = self.phase.lock();
        if !matches!(*phase, Phase::Uninitialized) {
            tracing::debug!(root = %self.project_root.display(), "Clearing codegen session");
        }
        *phase = Phase::Uninitialized;
    }

    fn start_load(&self, engine: Arc<dyn CodegenEngine>) -> SharedLoad {
        let root = self.project_root.clone();
        let options = self.options.clone();
        async move {
            match load_context(root, options, engine).await {
                Ok(cached) => Ok(Arc::new(cached)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load codegen context");
                    Err(Arc::new(e))
                }
            }
        }
        .boxed()
        .shared()
    }

    fn settle(&self, load: &SharedLoad, outcome: &LoadOutcome) {
        let mut phase = self.phase.lock();
        let current = matches!(&*phase, Phase::Loading(in_flight) if Shared::ptr_eq(in_flight, load));
        if !current {
            return;
        }
        *phase = match outcome {
            Ok(cached) => Phase::Ready(Arc::clone(cached)),
            Err(_) => Phase::Failed,
        };
    }
}

async fn load_context(
    root: PathBuf,
    options: SessionOptions,
    engine: Arc<dyn CodegenEngine>,
) -> Result<CachedContext> {
    let locator = ConfigLocator::new(&options.module_name)?;
    let config_path = locator.locate(&root, options.config_file_path.as_deref())?;

    let mut context = engine.create_context(&config_path).await?;
    context.set_cwd(&root);

    let mut config = context.config().clone();
    let original = config.absolutize(&root);
    context.update_config(config);

    tracing::info!(
        config = %config_path.display(),
        engine = engine.name(),
        "Loaded codegen context"
    );

    Ok(CachedContext {
        project_root: root,
        engine,
        context: tokio::sync::Mutex::new(context),
        original,
    })
}
