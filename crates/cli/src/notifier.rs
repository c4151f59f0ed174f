//! Terminal notifications.

use gqlwatch_core::{Notification, NotificationLevel, Notifier};

/// Prints notifications: info to stdout, warnings and errors to stderr
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let line = render(&notification);
        match notification.level {
            NotificationLevel::Info => println!("{line}"),
            NotificationLevel::Warning | NotificationLevel::Error => eprintln!("{line}"),
        }
    }
}

fn render(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Info => "✔",
        NotificationLevel::Warning => "⚠",
        NotificationLevel::Error => "✖",
    };
    format!("{marker} {}", notification.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marks_level() {
        assert_eq!(
            render(&Notification::info("codegen a.graphql done!")),
            "✔ codegen a.graphql done!"
        );
        assert_eq!(render(&Notification::warning("could not find 'x'")), "⚠ could not find 'x'");
        assert_eq!(render(&Notification::error("boom")), "✖ boom");
    }
}
