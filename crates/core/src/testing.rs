//! Shared test utilities.
//!
//! In-memory stand-ins for the engine, the engine lookup and the host's
//! notification display. Used by the unit tests in this crate, by the
//! integration tests and by host crates.

use crate::config::GenerationConfig;
use crate::engine::{CodegenContext, CodegenEngine, EngineProvider};
use crate::notifier::{Notification, Notifier};
use crate::{Error, GenerationFailure, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What [`FakeEngine::generate`] does
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Return `Ok(())`
    #[default]
    Succeed,
    /// Return [`Error::Generation`] with this failure
    Fail(GenerationFailure),
    /// Return a plain error carrying this message
    FailWithMessage(String),
}

/// Engine that hands out a fixed config and records every generate call
#[derive(Debug, Default)]
pub struct FakeEngine {
    config: GenerationConfig,
    create_delay: Option<Duration>,
    generate_delay: Option<Duration>,
    create_calls: AtomicUsize,
    failing_creates: AtomicUsize,
    outcome: Mutex<GenerateOutcome>,
    generated: Mutex<Vec<CodegenContext>>,
}

impl FakeEngine {
    /// Engine whose contexts hold `config`
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Engine whose contexts hold the config parsed from `value`
    ///
    /// # Panics
    ///
    /// Panics if `value` is not a valid config.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn from_json(value: serde_json::Value) -> Self {
        Self::new(serde_json::from_value(value).expect("invalid test config"))
    }

    /// Sleep this long inside `create_context`
    #[must_use]
    pub const fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    /// Sleep this long inside `generate`
    #[must_use]
    pub const fn with_generate_delay(mut self, delay: Duration) -> Self {
        self.generate_delay = Some(delay);
        self
    }

    /// Make the next `count` calls to `create_context` fail
    pub fn fail_next_creates(&self, count: usize) {
        self.failing_creates.store(count, Ordering::SeqCst);
    }

    /// Set what subsequent `generate` calls return
    pub fn set_outcome(&self, outcome: GenerateOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Number of `create_context` calls so far
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Contexts passed to `generate`, in call order
    #[must_use]
    pub fn generated(&self) -> Vec<CodegenContext> {
        self.generated.lock().clone()
    }

    /// Config passed to the most recent `generate` call
    #[must_use]
    pub fn last_generated_config(&self) -> Option<GenerationConfig> {
        self.generated.lock().last().map(|c| c.config().clone())
    }
}

#[async_trait]
impl CodegenEngine for FakeEngine {
    async fn create_context(&self, config_path: &Path) -> Result<CodegenContext> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::configuration(format!(
                "cannot read {}",
                config_path.display()
            )));
        }
        Ok(CodegenContext::new(config_path, self.config.clone()))
    }

    async fn generate(&self, context: &CodegenContext) -> Result<()> {
        if let Some(delay) = self.generate_delay {
            tokio::time::sleep(delay).await;
        }
        self.generated.lock().push(context.clone());
        match self.outcome.lock().clone() {
            GenerateOutcome::Succeed => Ok(()),
            GenerateOutcome::Fail(failure) => Err(Error::Generation(failure)),
            GenerateOutcome::FailWithMessage(message) => Err(Error::configuration(message)),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Provider returning a fixed engine, or reporting it missing
pub struct StaticEngineProvider {
    engine: Mutex<Option<Arc<dyn CodegenEngine>>>,
    location: PathBuf,
}

impl StaticEngineProvider {
    /// Provider with `engine` installed
    #[must_use]
    pub fn new(engine: Arc<dyn CodegenEngine>) -> Self {
        Self {
            engine: Mutex::new(Some(engine)),
            location: PathBuf::from("node_modules/@graphql-codegen/cli"),
        }
    }

    /// Provider with no engine; lookups fail with `location`
    #[must_use]
    pub fn missing(location: impl Into<PathBuf>) -> Self {
        Self {
            engine: Mutex::new(None),
            location: location.into(),
        }
    }

    /// Make `engine` available from now on
    pub fn install(&self, engine: Arc<dyn CodegenEngine>) {
        *self.engine.lock() = Some(engine);
    }

    /// Remove the engine
    pub fn uninstall(&self) {
        *self.engine.lock() = None;
    }
}

impl EngineProvider for StaticEngineProvider {
    fn engine(&self) -> Result<Arc<dyn CodegenEngine>> {
        self.engine
            .lock()
            .clone()
            .ok_or_else(|| Error::DependencyMissing {
                location: self.location.clone(),
            })
    }
}

/// Notifier that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Drain and return the notifications received so far
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
