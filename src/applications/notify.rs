// src/applications/notify.rs
//! User-visible notifications raised by store operations

use serde::Serialize;
use std::sync::Mutex;

use graflog::app_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications for one request so they can be returned with the
/// response.
#[derive(Debug, Default)]
pub struct NotificationBuffer {
    inner: Mutex<Vec<Notification>>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        match self.inner.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn has_errors(&self) -> bool {
        match self.inner.lock() {
            Ok(guard) => guard.iter().any(Notification::is_error),
            Err(poisoned) => poisoned.into_inner().iter().any(Notification::is_error),
        }
    }
}

impl Notifier for NotificationBuffer {
    fn notify(&self, notification: Notification) {
        match self.inner.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Prints notifications to the terminal; used by the CLI.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                app_log!(info, "{}", notification.message);
                println!("✓ {}", notification.message);
            }
            NotificationLevel::Error => {
                app_log!(error, "{}", notification.message);
                eprintln!("✗ {}", notification.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_take_drains() {
        let buffer = NotificationBuffer::new();
        buffer.notify(Notification::success("saved"));
        buffer.notify(Notification::error("failed"));
        assert!(buffer.has_errors());

        let taken = buffer.take();
        assert_eq!(taken.len(), 2);
        assert!(buffer.take().is_empty());
        assert!(!buffer.has_errors());
    }
}
