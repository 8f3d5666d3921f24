//! Notifications pushed to connected drivers and passengers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{DeliveryStatus, Notifier};
use crate::domain::{RequestId, Role, UserId, UserProfile};

/// Name and email shown to the other side of a ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl From<&UserProfile> for Contact {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name().to_owned(),
            email: profile.email().to_owned(),
        }
    }
}

/// Event delivered over a user's live connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Sent to a driver when a proposal is staged or restaged.
    ///
    /// `passengers` lists every pending passenger; the deltas are cumulative.
    NewProposition {
        request_id: RequestId,
        passengers: Vec<Contact>,
        length_delta_m: f64,
        duration_delta_ms: i64,
    },
    /// Sent to each pending passenger when the driver accepts.
    RoadAccepted { driver: Contact },
    /// Sent to each pending passenger when the driver rejects.
    RoadRejected,
}

impl Notification {
    /// Wire discriminator.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewProposition { .. } => "new_proposition",
            Self::RoadAccepted { .. } => "road_accepted",
            Self::RoadRejected => "road_rejected",
        }
    }
}

/// Fans notifications out through the [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn notify_driver(&self, driver_id: UserId, notification: &Notification) -> DeliveryStatus {
        let status = self.notifier.send(Role::Driver, driver_id, notification);
        debug!(user_id = %driver_id, kind = notification.kind(), ?status, "notified driver");
        status
    }

    pub fn notify_passenger(
        &self,
        passenger_id: UserId,
        notification: &Notification,
    ) -> DeliveryStatus {
        let status = self
            .notifier
            .send(Role::Passenger, passenger_id, notification);
        debug!(user_id = %passenger_id, kind = notification.kind(), ?status, "notified passenger");
        status
    }

    /// Send the same notification to each passenger; returns how many were
    /// delivered.
    pub fn notify_passengers(&self, passengers: &[UserId], notification: &Notification) -> usize {
        passengers
            .iter()
            .filter(|id| self.notify_passenger(**id, notification) == DeliveryStatus::Delivered)
            .count()
    }
}
