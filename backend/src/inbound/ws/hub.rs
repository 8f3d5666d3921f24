//! Registry of live WebSocket connections keyed by role and user id.
//!
//! The registry lock is held only for lookup, insert, and remove. Delivery
//! hands a serialised frame to the connection's unbounded outbox, which the
//! session task drains onto the socket, so [`Notifier::send`] never awaits
//! the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::domain::ports::{DeliveryStatus, Notifier};
use crate::domain::{Notification, Role, UserId};
use crate::inbound::ws::messages::NotificationMessage;

/// Identifier of one accepted socket.
pub type ConnectionId = u64;

/// Sending half of a connection's outbox.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbox: UnboundedSender<String>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

#[derive(Default)]
struct Registry {
    drivers: HashMap<UserId, Connection>,
    passengers: HashMap<UserId, Connection>,
}

impl Registry {
    fn table(&mut self, role: Role) -> &mut HashMap<UserId, Connection> {
        match role {
            Role::Driver => &mut self.drivers,
            Role::Passenger => &mut self.passengers,
        }
    }
}

/// Point-to-point notification hub implementing [`Notifier`].
#[derive(Default)]
pub struct ConnectionHub {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a connection and the receiver its session drains.
    pub fn open(&self) -> (Connection, UnboundedReceiver<String>) {
        let (outbox, inbox) = unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        (Connection { id, outbox }, inbox)
    }

    /// Bind `connection` to `(role, user_id)`, replacing any earlier binding.
    pub fn register(&self, role: Role, user_id: UserId, connection: Connection) {
        let connection_id = connection.id;
        let replaced = self.registry().table(role).insert(user_id, connection);
        info!(
            %role,
            %user_id,
            connection_id,
            replaced = replaced.is_some(),
            "websocket connection registered"
        );
    }

    /// Drop every binding that points at `connection_id`. Idempotent.
    pub fn unregister(&self, connection_id: ConnectionId) {
        let mut registry = self.registry();
        let before = registry.drivers.len() + registry.passengers.len();
        registry
            .drivers
            .retain(|_, connection| connection.id != connection_id);
        registry
            .passengers
            .retain(|_, connection| connection.id != connection_id);
        let removed = before - (registry.drivers.len() + registry.passengers.len());
        if removed > 0 {
            debug!(connection_id, removed, "websocket connection unregistered");
        }
    }

    /// Number of live bindings for `role`.
    pub fn connected(&self, role: Role) -> usize {
        self.registry().table(role).len()
    }
}

impl Notifier for ConnectionHub {
    fn send(&self, role: Role, user_id: UserId, notification: &Notification) -> DeliveryStatus {
        let frame = match serde_json::to_string(&NotificationMessage::from(notification)) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(%error, kind = notification.kind(), "failed to serialise notification");
                return DeliveryStatus::Dropped;
            }
        };

        let Some(connection) = self.registry().table(role).get(&user_id).cloned() else {
            info!(%role, %user_id, kind = notification.kind(), "no live connection; notification dropped");
            return DeliveryStatus::Dropped;
        };

        match connection.outbox.send(frame) {
            Ok(()) => DeliveryStatus::Delivered,
            Err(_) => {
                warn!(%role, %user_id, kind = notification.kind(), "connection closed; notification dropped");
                self.unregister(connection.id);
                DeliveryStatus::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use super::*;

    #[fixture]
    fn hub() -> ConnectionHub {
        ConnectionHub::new()
    }

    fn frame_type(frame: &str) -> String {
        let value: Value = serde_json::from_str(frame).expect("json frame");
        value
            .get("type")
            .and_then(Value::as_str)
            .expect("type tag")
            .to_owned()
    }

    #[rstest]
    fn delivers_to_registered_connection(hub: ConnectionHub) {
        let user = UserId::random();
        let (connection, mut inbox) = hub.open();
        hub.register(Role::Passenger, user, connection);

        let status = hub.send(Role::Passenger, user, &Notification::RoadRejected);

        assert_eq!(status, DeliveryStatus::Delivered);
        let frame = inbox.try_recv().expect("frame queued");
        assert_eq!(frame_type(&frame), "road_rejected");
    }

    #[rstest]
    fn absent_user_is_dropped_without_error(hub: ConnectionHub) {
        let status = hub.send(Role::Driver, UserId::random(), &Notification::RoadRejected);

        assert_eq!(status, DeliveryStatus::Dropped);
    }

    #[rstest]
    fn roles_are_separate_tables(hub: ConnectionHub) {
        let user = UserId::random();
        let (connection, _inbox) = hub.open();
        hub.register(Role::Driver, user, connection);

        assert_eq!(
            hub.send(Role::Passenger, user, &Notification::RoadRejected),
            DeliveryStatus::Dropped
        );
    }

    #[rstest]
    fn last_connect_wins(hub: ConnectionHub) {
        let user = UserId::random();
        let (first, mut first_inbox) = hub.open();
        let (second, mut second_inbox) = hub.open();
        hub.register(Role::Driver, user, first);
        hub.register(Role::Driver, user, second);

        hub.send(Role::Driver, user, &Notification::RoadRejected);

        assert!(first_inbox.try_recv().is_err());
        assert!(second_inbox.try_recv().is_ok());
        assert_eq!(hub.connected(Role::Driver), 1);
    }

    #[rstest]
    fn unregister_clears_every_binding_and_is_idempotent(hub: ConnectionHub) {
        let (connection, _inbox) = hub.open();
        let id = connection.id();
        hub.register(Role::Driver, UserId::random(), connection.clone());
        hub.register(Role::Passenger, UserId::random(), connection);

        hub.unregister(id);
        hub.unregister(id);

        assert_eq!(hub.connected(Role::Driver), 0);
        assert_eq!(hub.connected(Role::Passenger), 0);
    }

    #[rstest]
    fn stale_connection_does_not_evict_newer_one(hub: ConnectionHub) {
        let user = UserId::random();
        let (old, _old_inbox) = hub.open();
        let old_id = old.id();
        let (new, _new_inbox) = hub.open();
        hub.register(Role::Passenger, user, old);
        hub.register(Role::Passenger, user, new);

        hub.unregister(old_id);

        assert_eq!(hub.connected(Role::Passenger), 1);
    }

    #[rstest]
    fn closed_outbox_is_dropped_and_pruned(hub: ConnectionHub) {
        let user = UserId::random();
        let (connection, inbox) = hub.open();
        hub.register(Role::Passenger, user, connection);
        drop(inbox);

        let status = hub.send(Role::Passenger, user, &Notification::RoadRejected);

        assert_eq!(status, DeliveryStatus::Dropped);
        assert_eq!(hub.connected(Role::Passenger), 0);
    }
}
