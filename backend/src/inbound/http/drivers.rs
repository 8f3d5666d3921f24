//! Driver handlers: registration with road creation, and seat resizing.
//!
//! ```text
//! POST /api/v1/drivers/{userId}/road
//! PUT  /api/v1/drivers/{userId}/capacity {"newNumberOfPossiblePassengers":3}
//! ```

use actix_web::{HttpResponse, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{RegisterDriverRequest, RegisterDriverResponse};
use crate::domain::{Error, SeatCapacity, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_location, parse_window};

/// Request body for registering a driver and their road.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDriverBody {
    pub longitude: f64,
    pub latitude: f64,
    pub destination_longitude: f64,
    pub destination_latitude: f64,
    #[schema(format = "date-time")]
    pub departure_start: String,
    #[schema(format = "date-time")]
    pub departure_end: String,
    #[schema(minimum = 1)]
    pub number_of_available_seats: u32,
}

/// Request body for resizing a driver's seat total.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResizeCapacityBody {
    #[schema(minimum = 1)]
    pub new_number_of_possible_passengers: u32,
}

/// Seat totals after a capacity change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapacityBody {
    pub total_seats: u32,
    pub available_slots: u32,
}

impl From<SeatCapacity> for CapacityBody {
    fn from(capacity: SeatCapacity) -> Self {
        Self {
            total_seats: capacity.total_seats(),
            available_slots: capacity.available_slots(),
        }
    }
}

/// Road created for a registered driver.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverRoadBody {
    #[schema(format = "uuid")]
    pub road_id: String,
    pub capacity: CapacityBody,
}

impl From<RegisterDriverResponse> for DriverRoadBody {
    fn from(value: RegisterDriverResponse) -> Self {
        Self {
            road_id: value.road_id.to_string(),
            capacity: value.capacity.into(),
        }
    }
}

fn parse_register_driver(
    user_id: UserId,
    body: RegisterDriverBody,
) -> Result<RegisterDriverRequest, Error> {
    Ok(RegisterDriverRequest {
        user_id,
        location: parse_location(
            body.latitude,
            body.longitude,
            FieldName::new("latitude"),
            FieldName::new("longitude"),
        )?,
        destination: parse_location(
            body.destination_latitude,
            body.destination_longitude,
            FieldName::new("destinationLatitude"),
            FieldName::new("destinationLongitude"),
        )?,
        departure: parse_window(
            &body.departure_start,
            &body.departure_end,
            FieldName::new("departureStart"),
            FieldName::new("departureEnd"),
        )?,
        seats: body.number_of_available_seats,
    })
}

/// Register an existing user as a driver and create their active road.
#[utoipa::path(
    post,
    path = "/api/v1/drivers/{userId}/road",
    params(("userId" = String, Path, format = "uuid", description = "Registered user id")),
    request_body = RegisterDriverBody,
    responses(
        (status = 201, description = "Driver registered and road created", body = DriverRoadBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "User is already a driver or passenger", body = ErrorSchema),
        (status = 503, description = "Segment oracle unavailable", body = ErrorSchema)
    ),
    tags = ["drivers"],
    operation_id = "registerDriver"
)]
#[post("/drivers/{userId}/road")]
pub async fn register_driver(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RegisterDriverBody>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_id(&path.into_inner(), FieldName::new("userId"))?;
    let request = parse_register_driver(user_id, payload.into_inner())?;
    let response = state.registration.register_driver(request).await?;
    Ok(HttpResponse::Created().json(DriverRoadBody::from(response)))
}

/// Change a driver's seat total; free slots move by the same amount.
#[utoipa::path(
    put,
    path = "/api/v1/drivers/{userId}/capacity",
    params(("userId" = String, Path, format = "uuid", description = "Driver id")),
    request_body = ResizeCapacityBody,
    responses(
        (status = 200, description = "Capacity updated", body = CapacityBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown driver", body = ErrorSchema),
        (status = 409, description = "New total is below committed seats", body = ErrorSchema)
    ),
    tags = ["drivers"],
    operation_id = "resizeDriverCapacity"
)]
#[put("/drivers/{userId}/capacity")]
pub async fn resize_capacity(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResizeCapacityBody>,
) -> ApiResult<web::Json<CapacityBody>> {
    let driver_id = parse_id(&path.into_inner(), FieldName::new("userId"))?;
    let capacity = state
        .capacity
        .resize_driver_capacity(driver_id, payload.new_number_of_possible_passengers)
        .await?;
    Ok(web::Json(capacity.into()))
}

#[cfg(test)]
#[path = "drivers_tests.rs"]
mod tests;
