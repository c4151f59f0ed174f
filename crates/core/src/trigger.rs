//! Runs generation and turns the outcome into one notification.

use crate::engine::{CodegenContext, CodegenEngine};
use crate::notifier::Notification;
use crate::{Error, GenerationFailure};
use tokio_util::sync::CancellationToken;

/// Run `engine` for `context` and describe the outcome.
///
/// `label` names what was generated (a file name, or `documents` for a full
/// run). A cancelled run yields a warning; generation never panics into the
/// caller.
pub async fn run_generation(
    engine: &dyn CodegenEngine,
    context: &CodegenContext,
    label: &str,
    cancel: Option<&CancellationToken>,
) -> Notification {
    tracing::debug!(label, engine = engine.name(), "Starting generation");

    let result = match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::Cancelled),
            result = engine.generate(context) => result,
        },
        None => engine.generate(context).await,
    };

    match result {
        Ok(()) => {
            tracing::info!(label, "Generation finished");
            Notification::info(format!("codegen {label} done!"))
        }
        Err(Error::Cancelled) => {
            tracing::warn!(label, "Generation cancelled");
            Notification::warning(format!("codegen {label} cancelled"))
        }
        Err(err) => {
            tracing::error!(label, error = %err, "Generation failed");
            Notification::error(failure_message(&err))
        }
    }
}

/// User-facing message for a failed run
#[must_use]
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Generation(GenerationFailure { errors, .. }) if !errors.is_empty() => {
            let noun = if errors.len() == 1 { "error" } else { "errors" };
            format!(
                "Codegen threw {} {noun}, first one: {}",
                errors.len(),
                errors[0]
            )
        }
        other => other.to_string(),
    }
}
