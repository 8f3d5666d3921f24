//! Per-connection WebSocket handler.
//!
//! Each text frame from the client is a connect request binding the socket to
//! a role and user id. Frames queued in the connection's outbox by the hub
//! are written to the socket as they arrive. Pings go out every 5s and the
//! connection is closed after 10s without client traffic; tests shorten both.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::warn;

use crate::domain::UserId;
use crate::inbound::ws::hub::{Connection, ConnectionHub};
use crate::inbound::ws::messages::{ConnectRequest, ConnectedMessage};

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

pub(super) async fn handle_ws_session(
    hub: Arc<ConnectionHub>,
    session: Session,
    stream: MessageStream,
) {
    let (connection, inbox) = hub.open();
    let connection_id = connection.id();
    WsSession { hub: hub.clone(), connection }
        .run(session, stream, inbox)
        .await;
    hub.unregister(connection_id);
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    hub: Arc<ConnectionHub>,
    connection: Connection,
}

impl WsSession {
    async fn run(
        &self,
        mut session: Session,
        mut stream: MessageStream,
        mut inbox: UnboundedReceiver<String>,
    ) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, last_heartbeat).await
                }
                Some(frame) = inbox.recv() => {
                    session.text(frame).await.map_err(SessionError::Network)
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
            };

            if let Err(error) = result {
                Self::log_shutdown_reason(&error);
                if let CloseAction::Close(reason) = Self::close_action_for(error)
                    && let Err(error) = session.close(reason).await
                {
                    warn!(error = %error, "failed to close WebSocket session");
                }
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: Instant,
    ) -> Result<(), SessionError> {
        if last_heartbeat.elapsed() > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }
        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let message = message
            .ok_or(SessionError::StreamClosed)?
            .map_err(SessionError::Protocol)?;
        *last_heartbeat = Instant::now();

        match message {
            Message::Ping(payload) => session.pong(&payload).await.map_err(SessionError::Network),
            Message::Text(text) => self.handle_connect(session, &text).await,
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_connect(&self, session: &mut Session, text: &str) -> Result<(), SessionError> {
        let request = serde_json::from_str::<ConnectRequest>(text).map_err(|error| {
            warn!(error = %error, "rejected malformed WebSocket connect request");
            SessionError::InvalidPayload
        })?;

        self.hub.register(
            request.user_role,
            UserId::from_uuid(request.user_id),
            self.connection.clone(),
        );

        match serde_json::to_string(&ConnectedMessage::new(&request)) {
            Ok(ack) => session.text(ack).await.map_err(SessionError::Network),
            Err(error) => {
                warn!(error = %error, "failed to serialise connect acknowledgement");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
