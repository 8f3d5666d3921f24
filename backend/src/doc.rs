//! OpenAPI documentation for the REST and WebSocket surface.
//!
//! Domain types are documented through the wrappers in
//! [`crate::inbound::http::schemas`] so they stay free of utoipa derives.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ride matching API",
        description = "Driver and passenger registration, road proposals, driver decisions, and chain inspection."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register_user,
        crate::inbound::http::drivers::register_driver,
        crate::inbound::http::drivers::resize_capacity,
        crate::inbound::http::passengers::create_passenger_road,
        crate::inbound::http::decisions::resolve_decision,
        crate::inbound::http::roads::get_road,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::ws::ws_entry,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "User registration"),
        (name = "drivers", description = "Driver roads and seat capacity"),
        (name = "passengers", description = "Passenger road requests"),
        (name = "decisions", description = "Driver accept/reject decisions"),
        (name = "roads", description = "Ordered chain inspection"),
        (name = "notifications", description = "WebSocket notifications"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
