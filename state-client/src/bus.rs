//! Notification fan-out.
//!
//! Every notification the engine produces is published here; any number of
//! consumers subscribe and receive their own copy, in order.

use pitlane_state_types::Notification;
use tokio::sync::broadcast;

/// Broadcast bus for [`Notification`]s.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus that buffers `capacity` notifications per subscriber.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a notification.
    pub fn emit(&self, notification: Notification) {
        // No subscribers is not an error.
        if self.sender.send(notification).is_err() {
            tracing::trace!("Notification dropped: no subscribers");
        }
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}
