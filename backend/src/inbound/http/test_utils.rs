//! Test helpers for inbound HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::ports::{
    MockDriverCapacityCommand, MockPassengerRoadCommand, MockRegistrationCommand,
    MockRoadDecisionCommand, MockRoadQuery,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{configure, json_config};

/// Driving-port mocks; unset expectations fail the test if called.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub registration: MockRegistrationCommand,
    pub passenger_roads: MockPassengerRoadCommand,
    pub decisions: MockRoadDecisionCommand,
    pub capacity: MockDriverCapacityCommand,
    pub roads: MockRoadQuery,
}

impl MockPorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            registration: Arc::new(self.registration),
            passenger_roads: Arc::new(self.passenger_roads),
            decisions: Arc::new(self.decisions),
            capacity: Arc::new(self.capacity),
            roads: Arc::new(self.roads),
        })
    }
}

/// Initialise the full `/api/v1` surface over `ports`.
pub(crate) async fn init_app(
    ports: MockPorts,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .app_data(json_config())
            .configure(configure),
    )
    .await
}

/// Read a JSON response body.
pub(crate) async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

/// Read `details.<key>` from an error payload.
pub(crate) fn detail<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get("details")
        .and_then(|details| details.get(key))
        .and_then(Value::as_str)
}
