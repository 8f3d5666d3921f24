//! Full application wiring over in-memory adapters for scenario tests.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use ridematch::domain::{
    CapacityLedger, PassengerRoadService, RegistrationService, RidePorts, RoadDecisionService,
    RoadLocks, RoadQueryService, Role, UserId,
};
use ridematch::inbound::http::state::{HttpState, HttpStatePorts};
use ridematch::inbound::http::{configure, json_config};
use ridematch::inbound::ws::hub::ConnectionHub;
use ridematch::outbound::{GeometricSegmentOracle, InMemoryStore};
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;

/// Services sharing one store and one connection hub.
pub struct RideWorld {
    pub hub: Arc<ConnectionHub>,
    pub state: HttpState,
}

impl RideWorld {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let hub = Arc::new(ConnectionHub::new());
        let ports = RidePorts {
            riders: store.clone(),
            graph: store.clone(),
            capacity: store.clone(),
            matcher: store.clone(),
            oracle: Arc::new(GeometricSegmentOracle::new(store, 40.0)),
            notifier: hub.clone(),
            clock: Arc::new(DefaultClock),
            locks: Arc::new(RoadLocks::new()),
            oracle_timeout: Duration::from_secs(2),
        };
        let state = HttpState::new(HttpStatePorts {
            registration: Arc::new(RegistrationService::new(&ports)),
            passenger_roads: Arc::new(PassengerRoadService::new(&ports)),
            decisions: Arc::new(RoadDecisionService::new(&ports)),
            capacity: Arc::new(CapacityLedger::new(ports.capacity.clone())),
            roads: Arc::new(RoadQueryService::new(&ports)),
        });
        Self { hub, state }
    }

    /// Register a live connection for `user_id` and return its outbox.
    pub fn connect(&self, role: Role, user_id: &str) -> UnboundedReceiver<String> {
        let (connection, outbox) = self.hub.open();
        self.hub
            .register(role, UserId::new(user_id).expect("user id"), connection);
        outbox
    }
}

pub async fn init_app(
    world: &RideWorld,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(world.state.clone()))
            .app_data(json_config())
            .configure(configure),
    )
    .await
}

pub async fn call_json<S>(app: &S, request: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(app, request).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

pub async fn register_user<S>(app: &S, name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "name": name, "email": format!("{name}@example.com") }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().expect("user id").to_owned()
}

/// Register a driver heading north-east across central Paris.
pub async fn register_driver<S>(app: &S, user_id: &str, seats: u32) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/drivers/{user_id}/road"))
        .set_json(json!({
            "latitude": 48.85,
            "longitude": 2.30,
            "destinationLatitude": 48.90,
            "destinationLongitude": 2.40,
            "departureStart": "2026-06-01T08:00:00Z",
            "departureEnd": "2026-06-01T09:00:00Z",
            "numberOfAvailableSeats": seats,
        }))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["roadId"].as_str().expect("road id").to_owned()
}

pub async fn request_road<S>(app: &S, user_id: &str, party: u32, latitude: f64) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/passengers/{user_id}/road"))
        .set_json(json!({
            "latitude": latitude,
            "longitude": 2.35,
            "numberOfPeople": party,
            "initialDepartureTime": "2026-06-01T08:15:00Z",
            "finalDepartureTime": "2026-06-01T08:45:00Z",
        }))
        .to_request();
    call_json(app, request).await
}

pub async fn decide<S>(app: &S, driver_id: &str, request_id: &str, decision: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(&format!("/api/v1/road-decisions/{request_id}"))
        .insert_header(("driver-id", driver_id))
        .set_json(json!({ "decision": decision }))
        .to_request();
    call_json(app, request).await
}

pub async fn resize<S>(app: &S, driver_id: &str, seats: u32) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/drivers/{driver_id}/capacity"))
        .set_json(json!({ "newNumberOfPossiblePassengers": seats }))
        .to_request();
    call_json(app, request).await
}

pub async fn road<S>(app: &S, road_id: &str, variant: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/roads/{road_id}?variant={variant}"))
        .to_request();
    let (status, body) = call_json(app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

/// Drain every frame currently queued on `outbox` as JSON.
pub fn frames(outbox: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = outbox.try_recv() {
        frames.push(serde_json::from_str(&frame).expect("JSON frame"));
    }
    frames
}
