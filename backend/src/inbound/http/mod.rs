//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! POST /api/v1/users
//! POST /api/v1/drivers/{userId}/road
//! PUT  /api/v1/drivers/{userId}/capacity
//! POST /api/v1/passengers/{userId}/road
//! POST /api/v1/road-decisions/{requestId}
//! GET  /api/v1/roads/{roadId}?variant=active|temporary
//! ```

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

pub mod decisions;
pub mod drivers;
pub mod error;
pub mod health;
pub mod passengers;
pub mod roads;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
mod validation;

pub use error::ApiResult;

/// JSON extractor config turning malformed bodies into `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed JSON body: {err}"))
            .with_details(json!({ "code": "invalid_json" }))
            .into()
    })
}

/// Register every `/api/v1` handler on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(users::register_user)
            .service(drivers::register_driver)
            .service(drivers::resize_capacity)
            .service(passengers::create_passenger_road)
            .service(decisions::resolve_decision)
            .service(roads::get_road),
    );
}
