use super::{CommandContext, CommandStatus};
use crate::notifier::ConsoleNotifier;
use gqlwatch_core::NotificationLevel;
use std::sync::Arc;

/// Generate for the full original document set
pub async fn execute(context: &CommandContext) -> CommandStatus {
    let service = context.service(Arc::new(ConsoleNotifier::new()));
    let notification = service.generate_all().await;

    match notification.level {
        NotificationLevel::Info => CommandStatus::Success,
        NotificationLevel::Warning | NotificationLevel::Error => CommandStatus::Failure,
    }
}
