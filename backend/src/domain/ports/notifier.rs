//! Port for best-effort point-to-point notifications.

use crate::domain::{Notification, Role, UserId};

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handed to a live connection's outbox.
    Delivered,
    /// No live connection; the message was logged and discarded.
    Dropped,
}

/// Deliver-by-user-id primitive.
///
/// Implementations must not block or await the network: messages are handed
/// to a per-connection outbox and never retried or queued for later.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Send `notification` to the user registered under `role`.
    fn send(&self, role: Role, user_id: UserId, notification: &Notification) -> DeliveryStatus;
}
