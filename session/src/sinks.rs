//! Notification sinks shipped with the session.

use horde_core::{Notification, NotificationKind, NotificationSink};
use tracing::debug;

/// Sink that writes every notification to the log at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn broadcast(&mut self, kind: NotificationKind, payload: Notification) {
        debug!(?kind, ?payload, "notification");
    }
}

/// Sink that keeps every notification in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    notifications: Vec<(NotificationKind, Notification)>,
}

impl RecordingSink {
    /// Notifications received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[(NotificationKind, Notification)] {
        &self.notifications
    }

    /// Number of notifications of the provided kind.
    #[must_use]
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.notifications
            .iter()
            .filter(|(received, _)| *received == kind)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn broadcast(&mut self, kind: NotificationKind, payload: Notification) {
        self.notifications.push((kind, payload));
    }
}
