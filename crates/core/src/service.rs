//! Save handler and manual command handler.
//!
//! Every qualifying event produces exactly one notification; saves that the
//! gate rejects produce none.

use crate::notifier::{Notification, Notifier};
use crate::partition::{PartitionReport, partition_documents, restore_documents};
use crate::session::Session;
use crate::settings::Settings;
use crate::trigger::{failure_message, run_generation};
use crate::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs generation for saves and manual requests against one session
pub struct CodegenService {
    session: Arc<Session>,
    settings: Settings,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
}

impl CodegenService {
    /// Create a service reporting through `notifier`
    #[must_use]
    pub fn new(session: Arc<Session>, settings: Settings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            settings,
            notifier,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancel running generations when `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The session backing this service
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Active settings
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle a save of `path`.
    ///
    /// Returns the notification that was emitted, or `None` when the file
    /// does not qualify.
    pub async fn on_save(&self, path: &Path) -> Option<Notification> {
        match self.settings.should_generate_for(path, self.session.project_root()) {
            Ok(true) => {}
            Ok(false) => {
                tracing::trace!(path = %path.display(), "Save does not qualify for codegen");
                return None;
            }
            Err(e) => return Some(self.emit(notification_for_error(&e))),
        }

        tracing::info!(path = %path.display(), "Running codegen for saved file");
        let notification = match self.generate_for_file(path).await {
            Ok(notification) => notification,
            Err(e) => notification_for_error(&e),
        };
        Some(self.emit(notification))
    }

    /// Run generation for the full original document set.
    pub async fn generate_all(&self) -> Notification {
        tracing::info!(root = %self.session.project_root().display(), "Running full codegen");
        let notification = match self.generate_everything().await {
            Ok(notification) => notification,
            Err(e) => notification_for_error(&e),
        };
        self.emit(notification)
    }

    /// Work out what a save of `path` would regenerate, without generating.
    ///
    /// The cached config is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be loaded or a document glob
    /// is invalid.
    pub async fn plan(&self, path: &Path) -> Result<PartitionReport> {
        let cached = self.session.load().await?;
        let mut config = cached.context().lock().await.config().clone();
        partition_documents(&mut config, path, cached.project_root(), cached.original())
    }

    /// Cancel running work and drop the cached context.
    ///
    /// The cancellation token stays cancelled, so generations started
    /// afterwards end as cancelled too.
    pub fn deactivate(&self) {
        tracing::debug!("Deactivating codegen service");
        self.cancel.cancel();
        self.session.clear();
    }

    async fn generate_for_file(&self, path: &Path) -> Result<Notification> {
        let cached = self.session.load().await?;
        let mut context = cached.context().lock().await;

        let mut config = context.config().clone();
        let report = partition_documents(&mut config, path, cached.project_root(), cached.original())?;
        context.update_config(config);

        tracing::debug!(
            single_artifact = report.single_artifact,
            selected = ?report.selected,
            skipped = ?report.skipped,
            "Partitioned documents for save"
        );

        let label = path.to_string_lossy();
        Ok(run_generation(cached.engine().as_ref(), &context, &label, Some(&self.cancel)).await)
    }

    async fn generate_everything(&self) -> Result<Notification> {
        let cached = self.session.load().await?;
        let mut context = cached.context().lock().await;

        let mut config = context.config().clone();
        restore_documents(&mut config, cached.project_root(), cached.original());
        let label = config
            .documents
            .as_ref()
            .map_or_else(|| "documents".to_string(), |d| d.patterns().join(", "));
        context.update_config(config);

        Ok(run_generation(cached.engine().as_ref(), &context, &label, Some(&self.cancel)).await)
    }

    fn emit(&self, notification: Notification) -> Notification {
        self.notifier.notify(notification.clone());
        notification
    }
}

/// Map an error that stopped an event before generation ran
fn notification_for_error(err: &Error) -> Notification {
    match err {
        Error::DependencyMissing { .. } | Error::Cancelled => Notification::warning(err.to_string()),
        _ => Notification::error(failure_message(err)),
    }
}
