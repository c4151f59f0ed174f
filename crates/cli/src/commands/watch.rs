use super::CommandContext;
use crate::notifier::ConsoleNotifier;
use crate::shutdown::install_signal_handlers;
use crate::watcher::DocumentWatcher;
use miette::IntoDiagnostic;
use std::sync::Arc;
use std::time::Duration;

/// Generate for every saved document until interrupted
pub async fn execute(context: &CommandContext, debounce: Duration) -> miette::Result<()> {
    let shutdown = install_signal_handlers();
    let service = context
        .service(Arc::new(ConsoleNotifier::new()))
        .with_cancellation(shutdown.child_token());

    let mut watcher = DocumentWatcher::new(&context.root, debounce)
        .into_diagnostic()
        .map_err(|e| e.wrap_err("Failed to start file watcher"))?;

    eprintln!(
        "Watching {} for GraphQL document saves (Ctrl+C to stop)",
        context.root.display()
    );

    loop {
        tokio::select! {
            () = shutdown.wait_for_shutdown() => break,
            batch = watcher.next_batch() => {
                let Some(paths) = batch else {
                    tracing::warn!("File watcher stopped");
                    break;
                };
                for path in paths {
                    if shutdown.is_shutdown() {
                        break;
                    }
                    service.on_save(&path).await;
                }
            }
        }
    }

    service.deactivate();
    tracing::info!("Watch stopped");
    Ok(())
}
