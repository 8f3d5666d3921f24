//! Server construction and adapter wiring.

mod config;

pub use config::{ServerConfig, ServerSettings};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use ridematch::Trace;
#[cfg(debug_assertions)]
use ridematch::doc::ApiDoc;
use ridematch::domain::{
    CapacityLedger, PassengerRoadService, RegistrationService, RidePorts, RoadDecisionService,
    RoadLocks, RoadQueryService,
};
use ridematch::inbound::http::health::{HealthState, live, ready};
use ridematch::inbound::http::state::{HttpState, HttpStatePorts};
use ridematch::inbound::http::{configure, json_config};
use ridematch::inbound::ws;
use ridematch::inbound::ws::hub::ConnectionHub;
use ridematch::inbound::ws::state::WsState;
use ridematch::outbound::{GeometricSegmentOracle, InMemoryStore};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire the in-memory adapters, geometric oracle, and connection hub into
/// the driving ports.
fn build_states(config: &ServerConfig) -> (HttpState, WsState) {
    let store = Arc::new(InMemoryStore::new());
    let hub = Arc::new(ConnectionHub::new());
    let oracle = Arc::new(GeometricSegmentOracle::new(
        store.clone(),
        config.average_speed_kmh,
    ));
    let ports = RidePorts {
        riders: store.clone(),
        graph: store.clone(),
        capacity: store.clone(),
        matcher: store,
        oracle,
        notifier: hub.clone(),
        clock: Arc::new(DefaultClock),
        locks: Arc::new(RoadLocks::new()),
        oracle_timeout: config.oracle_timeout,
    };
    let http_state = HttpState::new(HttpStatePorts {
        registration: Arc::new(RegistrationService::new(&ports)),
        passenger_roads: Arc::new(PassengerRoadService::new(&ports)),
        decisions: Arc::new(RoadDecisionService::new(&ports)),
        capacity: Arc::new(CapacityLedger::new(ports.capacity.clone())),
        roads: Arc::new(RoadQueryService::new(&ports)),
    });
    let ws_state = WsState::new(hub, config.allowed_origins.clone());
    (http_state, ws_state)
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(json_config())
        .wrap(Trace)
        .configure(configure)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and mark it ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let (http_state, ws_state) = build_states(&config);
    let http_state = web::Data::new(http_state);
    let ws_state = web::Data::new(ws_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    info!(bind_addr = %config.bind_addr, "ride matching server listening");
    Ok(server)
}
