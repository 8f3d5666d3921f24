//! WebSocket session handler tests.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{DeliveryStatus, Notifier};
use crate::domain::{Notification, Role};
use crate::inbound::ws;
use crate::inbound::ws::state::{AllowedOrigins, WsState};

const ORIGIN: &str = "http://localhost:3000";

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

#[fixture]
async fn ws_client() -> (Socket, Arc<ConnectionHub>, ServerHandle) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let hub = Arc::new(ConnectionHub::new());
    let ws_state = WsState::new(hub.clone(), AllowedOrigins::parse([ORIGIN]));
    let server: Server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("http://{addr}/ws"))
        .set_header(header::ORIGIN, ORIGIN)
        .connect()
        .await
        .expect("websocket connect");

    (socket, hub, handle)
}

async fn next_text_frame(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn connect_as(socket: &mut Socket, role: &str, user_id: Uuid) -> Value {
    socket
        .send(Message::Text(
            json!({"userRole": role, "userId": user_id}).to_string().into(),
        ))
        .await
        .expect("send connect request");
    next_text_frame(socket).await
}

#[rstest]
#[actix_rt::test]
async fn acknowledges_connect_request(
    #[future] ws_client: (Socket, Arc<ConnectionHub>, ServerHandle),
) {
    let (mut socket, hub, _server) = ws_client.await;
    let user_id = Uuid::new_v4();

    let ack = connect_as(&mut socket, "driver", user_id).await;

    assert_eq!(ack.get("type").and_then(Value::as_str), Some("connected"));
    assert_eq!(ack.get("userRole").and_then(Value::as_str), Some("driver"));
    assert_eq!(hub.connected(Role::Driver), 1);
}

#[rstest]
#[actix_rt::test]
async fn forwards_hub_notifications(
    #[future] ws_client: (Socket, Arc<ConnectionHub>, ServerHandle),
) {
    let (mut socket, hub, _server) = ws_client.await;
    let user_id = Uuid::new_v4();
    connect_as(&mut socket, "passenger", user_id).await;

    let status = hub.send(
        Role::Passenger,
        UserId::from_uuid(user_id),
        &Notification::RoadRejected,
    );

    assert_eq!(status, DeliveryStatus::Delivered);
    let frame = next_text_frame(&mut socket).await;
    assert_eq!(frame.get("type").and_then(Value::as_str), Some("road_rejected"));
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_connect_request(
    #[future] ws_client: (Socket, Arc<ConnectionHub>, ServerHandle),
) {
    let (mut socket, hub, _server) = ws_client.await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let frame = socket.next().await.expect("response frame").expect("frame");
    match frame {
        Frame::Close(reason) => {
            assert_eq!(reason.expect("reason").code, CloseCode::Policy);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
    assert_eq!(hub.connected(Role::Driver), 0);
}

#[rstest]
#[actix_rt::test]
async fn closing_the_socket_unregisters(
    #[future] ws_client: (Socket, Arc<ConnectionHub>, ServerHandle),
) {
    let (mut socket, hub, _server) = ws_client.await;
    connect_as(&mut socket, "driver", Uuid::new_v4()).await;

    socket
        .send(Message::Close(None))
        .await
        .expect("send close");
    tokio::time::timeout(Duration::from_secs(2), async {
        while hub.connected(Role::Driver) > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection unregistered after close");
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (Socket, Arc<ConnectionHub>, ServerHandle),
) {
    let (mut socket, _hub, _server) = ws_client.await;

    let observed_close = tokio::time::timeout(CLIENT_TIMEOUT * 4, async {
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => return reason,
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        None
    })
    .await
    .expect("close frame within timeout")
    .expect("close reason present");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
