//! Notification port.
//!
//! The tracker hands (title, body, urgent) triples to a [`Notifier`] through a
//! [`NotificationGateway`], which applies the user's toggles and swallows
//! backend failures so that a broken notifier never interrupts tracking.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::NotifyError;
use crate::storage::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub urgent: bool,
    /// Urgent and the user has sound turned on.
    pub sound: bool,
}

/// A backend that can put a notification in front of the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log. Used when no richer backend is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            title = %notification.title,
            urgent = notification.urgent,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Keeps every notification it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Number of notifications received with this title.
    pub fn count(&self, title: &str) -> usize {
        self.sent().iter().filter(|n| n.title == title).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Backend("recorder poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}

/// Applies the notification toggles and contains backend failures.
#[derive(Clone)]
pub struct NotificationGateway {
    notifier: Arc<dyn Notifier>,
}

impl NotificationGateway {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Deliver a notification if the user has them enabled. Never fails.
    pub fn send(&self, settings: &Settings, title: &str, body: &str, urgent: bool) {
        if !settings.notifications_enabled {
            debug!(title, "notifications disabled, dropping");
            return;
        }
        let notification = Notification {
            title: title.to_string(),
            body: body.to_string(),
            urgent,
            sound: urgent && settings.sound_enabled,
        };
        if let Err(e) = self.notifier.notify(&notification) {
            warn!(title, error = %e, "notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::PermissionDenied)
        }
    }

    #[test]
    fn disabled_notifications_are_dropped() {
        let recorder = Arc::new(RecordingNotifier::new());
        let gateway = NotificationGateway::new(recorder.clone());
        let settings = Settings {
            notifications_enabled: false,
            ..Settings::default()
        };
        gateway.send(&settings, "Break Started", "body", true);
        assert!(recorder.sent().is_empty());
    }

    #[test]
    fn sound_follows_urgency_and_toggle() {
        let recorder = Arc::new(RecordingNotifier::new());
        let gateway = NotificationGateway::new(recorder.clone());
        let mut settings = Settings::default();
        gateway.send(&settings, "a", "", true);
        gateway.send(&settings, "b", "", false);
        settings.sound_enabled = false;
        gateway.send(&settings, "c", "", true);

        let sounds: Vec<bool> = recorder.sent().iter().map(|n| n.sound).collect();
        assert_eq!(sounds, vec![true, false, false]);
    }

    #[test]
    fn backend_failure_is_swallowed() {
        let gateway = NotificationGateway::new(Arc::new(Failing));
        gateway.send(&Settings::default(), "Tracking Started", "", false);
    }
}
