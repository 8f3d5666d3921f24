//! Passenger road request handler.
//!
//! ```text
//! POST /api/v1/passengers/{userId}/road
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{PassengerRoadResponse, RegisterPassengerRequest};
use crate::domain::{Error, PartySize, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_location, parse_window};

/// Request body describing the passenger party and pickup window.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRoadBody {
    pub longitude: f64,
    pub latitude: f64,
    #[schema(minimum = 1)]
    pub number_of_people: u32,
    #[schema(format = "date-time")]
    pub initial_departure_time: String,
    #[schema(format = "date-time")]
    pub final_departure_time: String,
}

/// Proposal staged for the matched driver.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRoadResponseBody {
    #[schema(format = "uuid")]
    pub request_id: String,
    #[schema(format = "uuid")]
    pub road_id: String,
    /// `staged` or `staged_updated`.
    pub state: String,
}

impl From<PassengerRoadResponse> for PassengerRoadResponseBody {
    fn from(value: PassengerRoadResponse) -> Self {
        Self {
            request_id: value.request_id.to_string(),
            road_id: value.road_id.to_string(),
            state: value.state.as_str().to_owned(),
        }
    }
}

fn parse_passenger(
    user_id: UserId,
    body: PassengerRoadBody,
) -> Result<RegisterPassengerRequest, Error> {
    let party_size = PartySize::new(body.number_of_people).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "numberOfPeople",
            "code": "out_of_range",
        }))
    })?;
    Ok(RegisterPassengerRequest {
        user_id,
        location: parse_location(
            body.latitude,
            body.longitude,
            FieldName::new("latitude"),
            FieldName::new("longitude"),
        )?,
        party_size,
        departure: parse_window(
            &body.initial_departure_time,
            &body.final_departure_time,
            FieldName::new("initialDepartureTime"),
            FieldName::new("finalDepartureTime"),
        )?,
    })
}

/// Register the passenger party and stage it onto the best matching road.
///
/// The driver is notified over WebSocket when the proposal is staged.
#[utoipa::path(
    post,
    path = "/api/v1/passengers/{userId}/road",
    params(("userId" = String, Path, format = "uuid", description = "Registered user id")),
    request_body = PassengerRoadBody,
    responses(
        (status = 201, description = "Proposal staged", body = PassengerRoadResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown user or no matching road", body = ErrorSchema),
        (status = 409, description = "Already riding, pending, or seats exhausted", body = ErrorSchema),
        (status = 503, description = "Segment oracle unavailable", body = ErrorSchema)
    ),
    tags = ["passengers"],
    operation_id = "createPassengerRoad"
)]
#[post("/passengers/{userId}/road")]
pub async fn create_passenger_road(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PassengerRoadBody>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_id(&path.into_inner(), FieldName::new("userId"))?;
    let request = parse_passenger(user_id, payload.into_inner())?;
    state.registration.register_passenger(request).await?;
    let response = state.passenger_roads.create_passenger_road(user_id).await?;
    Ok(HttpResponse::Created().json(PassengerRoadResponseBody::from(response)))
}

#[cfg(test)]
#[path = "passengers_tests.rs"]
mod tests;
