//! Driver decision handler.
//!
//! ```text
//! POST /api/v1/road-decisions/{requestId}
//! driver-id: <uuid>
//! {"decision":"accept"}
//! ```

use actix_web::{HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{RoadDecisionRequest, RoadDecisionResponse};
use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Header naming the driver that owns the road.
pub const DRIVER_ID_HEADER: &str = "driver-id";

/// Request body carrying the driver's verdict.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBody {
    /// `accept` or `reject`.
    #[schema(example = "accept")]
    pub decision: String,
}

/// Outcome of a resolved decision.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponseBody {
    #[schema(format = "uuid")]
    pub request_id: String,
    #[schema(format = "uuid")]
    pub road_id: String,
    pub decision: String,
    #[schema(value_type = Vec<uuid::Uuid>)]
    pub passengers: Vec<String>,
    /// Passengers reached over a live connection.
    pub notified: usize,
}

impl From<RoadDecisionResponse> for DecisionResponseBody {
    fn from(value: RoadDecisionResponse) -> Self {
        Self {
            request_id: value.request_id.to_string(),
            road_id: value.road_id.to_string(),
            decision: value.decision.to_string(),
            passengers: value.passengers.iter().map(ToString::to_string).collect(),
            notified: value.delivered,
        }
    }
}

fn driver_id(req: &HttpRequest) -> Result<UserId, Error> {
    let raw = req
        .headers()
        .get(DRIVER_ID_HEADER)
        .ok_or_else(|| {
            Error::invalid_request("missing driver-id header").with_details(json!({
                "field": DRIVER_ID_HEADER,
                "code": "missing_header",
            }))
        })?
        .to_str()
        .map_err(|_| {
            Error::invalid_request("driver-id header must be ASCII").with_details(json!({
                "field": DRIVER_ID_HEADER,
                "code": "invalid_header",
            }))
        })?;
    parse_id(raw, FieldName::new(DRIVER_ID_HEADER))
}

/// Accept or reject the staged proposal identified by `requestId`.
///
/// Accepting promotes the temporary chain and notifies every pending
/// passenger; rejecting discards it, frees their seats, and notifies them.
#[utoipa::path(
    post,
    path = "/api/v1/road-decisions/{requestId}",
    params(
        ("requestId" = String, Path, format = "uuid", description = "Staged request id"),
        ("driver-id" = String, Header, format = "uuid", description = "Driver owning the road")
    ),
    request_body = DecisionBody,
    responses(
        (status = 200, description = "Decision applied", body = DecisionResponseBody),
        (status = 400, description = "Invalid decision or ids", body = ErrorSchema),
        (status = 403, description = "Driver is not linked to the request", body = ErrorSchema),
        (status = 404, description = "Unknown driver or request", body = ErrorSchema),
        (status = 409, description = "Proposal is not pending", body = ErrorSchema)
    ),
    tags = ["decisions"],
    operation_id = "resolveRoadDecision"
)]
#[post("/road-decisions/{requestId}")]
pub async fn resolve_decision(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Json<DecisionBody>,
) -> ApiResult<web::Json<DecisionResponseBody>> {
    let request_id = parse_id(&path.into_inner(), FieldName::new("requestId"))?;
    let driver_id = driver_id(&req)?;
    let response = state
        .decisions
        .resolve_decision(RoadDecisionRequest {
            driver_id,
            request_id,
            decision: payload.into_inner().decision,
        })
        .await?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
#[path = "decisions_tests.rs"]
mod tests;
