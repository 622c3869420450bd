//! # Notifiers
//!
//! Stock implementations of the [`Notifier`] port.
//!
//! - [`TracingNotifier`] writes notifications to the log. Used by the CLI.
//! - [`ChannelNotifier`] broadcasts them so a UI can show toasts.
//! - [`NoOpNotifier`] drops them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::ports::{Notifier, Severity};

/// A notification as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

/// Logs notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(target: "stockcart::notify", "{}", message),
            Severity::Warning => warn!(target: "stockcart::notify", "{}", message),
            Severity::Error => error!(target: "stockcart::notify", "{}", message),
        }
    }
}

/// Broadcasts notifications to any number of subscribers.
///
/// Sending with no subscribers is not an error; the notification is dropped.
/// Slow subscribers lose the oldest notifications once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier buffering up to `capacity` notifications per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        ChannelNotifier { tx }
    }

    /// Subscribes to notifications sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        let notification = Notification {
            message: message.to_string(),
            severity,
            at: Utc::now(),
        };

        if self.tx.send(notification).is_err() {
            debug!(dropped = %message, "Notification dropped, no subscribers");
        }
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let notifier = ChannelNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify("Requested quantity is out of stock", Severity::Error);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "Requested quantity is out of stock");
        assert_eq!(received.severity, Severity::Error);
    }

    #[test]
    fn test_channel_notifier_without_subscribers() {
        let notifier = ChannelNotifier::new(8);
        notifier.notify("nobody listening", Severity::Info);
    }

    #[test]
    fn test_notification_json_shape() {
        let json = serde_json::to_value(Notification {
            message: "x".to_string(),
            severity: Severity::Warning,
            at: Utc::now(),
        })
        .unwrap();

        assert_eq!(json["severity"], "warning");
        assert!(json.get("at").is_some());
    }
}
