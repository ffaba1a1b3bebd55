use std::io::Write;

use calmpulse_core::{Notification, Notifier, NotifyError};

/// Prints notifications inline with shell output. Urgent ones with sound
/// enabled ring the terminal bell.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let bell = if notification.sound { "\x07" } else { "" };
        let mut out = std::io::stdout().lock();
        writeln!(out, "{bell}[{}] {}", notification.title, notification.body)
            .and_then(|_| out.flush())
            .map_err(|e| NotifyError::Backend(e.to_string()))
    }
}
