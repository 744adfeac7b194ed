//! User-visible notifications
//!
//! The only user-facing output besides the generated file. Levels mirror an
//! editor's information, warning and error messages.

use std::sync::Mutex;

use colored::*;
use tracing::{error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Info => {
                info!(message = %notification.message, "notification");
                println!("{} {}", "✓".green(), notification.message);
            }
            Level::Warning => {
                warn!(message = %notification.message, "notification");
                eprintln!("{} {}", "!".yellow(), notification.message.yellow());
            }
            Level::Error => {
                error!(message = %notification.message, "notification");
                eprintln!("{} {}", "✗".red(), notification.message.red());
            }
        }
    }
}

/// Keeps every notification in memory, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    /// Recorded notifications of one level
    pub fn at_level(&self, level: Level) -> Vec<Notification> {
        self.notifications().into_iter().filter(|n| n.level == level).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::warning("first"));
        notifier.notify(Notification::info("second"));
        notifier.notify(Notification::error("third"));

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], Notification::warning("first"));
        assert_eq!(seen[1].message, "second");
        assert_eq!(notifier.at_level(Level::Error), vec![Notification::error("third")]);
    }
}
