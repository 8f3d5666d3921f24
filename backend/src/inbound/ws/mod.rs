//! WebSocket inbound adapter delivering ride notifications.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - bind each socket to a driver or passenger in the [`hub::ConnectionHub`]
//! - forward queued notifications onto the socket

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

pub mod hub;
pub mod messages;
mod session;
pub mod state;

use state::{AllowedOrigins, WsState};

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[utoipa::path(
    get,
    path = "/ws",
    tags = ["notifications"],
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 400, description = "Malformed Origin header"),
        (status = 403, description = "Origin not allowed")
    )
)]
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&state.allowed_origins, origin_header)?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    actix_web::rt::spawn(session::handle_ws_session(
        state.hub.clone(),
        session,
        messages,
    ));
    Ok(response)
}

fn validate_origin(
    allowed: &AllowedOrigins,
    origin_header: &HeaderValue,
) -> actix_web::Result<()> {
    let origin_value = origin_header.to_str().map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as string");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
