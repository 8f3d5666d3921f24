//! Road chain inspection handler.
//!
//! ```text
//! GET /api/v1/roads/{roadId}?variant=temporary
//! ```

use actix_web::{get, web};
use route_chain::ChainVariant;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{RoadSegmentView, RoadView};
use crate::domain::{Error, SegmentCost};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Query parameters for the road view.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RoadViewParams {
    /// `active` (default) or `temporary`.
    pub variant: Option<String>,
}

/// Duration and length of a segment or a whole chain.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostBody {
    pub duration_ms: u64,
    pub length_m: f64,
}

impl From<SegmentCost> for CostBody {
    fn from(cost: SegmentCost) -> Self {
        Self {
            duration_ms: cost.duration_ms,
            length_m: cost.length_m,
        }
    }
}

/// One position in the ordered chain.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadSegmentBody {
    pub segment_hash: String,
    /// Passenger dropped off at the end of this segment.
    #[schema(format = "uuid")]
    pub alighting_user_id: Option<String>,
    pub cost: CostBody,
}

impl From<RoadSegmentView> for RoadSegmentBody {
    fn from(view: RoadSegmentView) -> Self {
        Self {
            segment_hash: view.segment_hash.to_string(),
            alighting_user_id: view.alighting_user_id.map(|id| id.to_string()),
            cost: view.cost.into(),
        }
    }
}

/// Ordered chain of a road with totals.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoadBody {
    #[schema(format = "uuid")]
    pub road_id: String,
    #[schema(format = "uuid")]
    pub driver_id: String,
    pub variant: String,
    /// Pending request id; only set on a staged temporary chain.
    #[schema(format = "uuid")]
    pub request_id: Option<String>,
    pub segments: Vec<RoadSegmentBody>,
    pub total: CostBody,
}

impl From<RoadView> for RoadBody {
    fn from(view: RoadView) -> Self {
        Self {
            road_id: view.road_id.to_string(),
            driver_id: view.driver_id.to_string(),
            variant: view.variant.to_string(),
            request_id: view.request_id.map(|id| id.to_string()),
            segments: view.segments.into_iter().map(Into::into).collect(),
            total: view.total.into(),
        }
    }
}

fn parse_variant(raw: Option<&str>) -> Result<ChainVariant, Error> {
    raw.map_or(Ok(ChainVariant::Active), |value| {
        value.parse().map_err(|_: String| {
            Error::invalid_request("variant must be active or temporary").with_details(json!({
                "field": "variant",
                "value": value,
                "code": "invalid_variant",
            }))
        })
    })
}

/// Return the active or staged chain of a road in driving order.
#[utoipa::path(
    get,
    path = "/api/v1/roads/{roadId}",
    params(
        ("roadId" = String, Path, format = "uuid", description = "Road id"),
        RoadViewParams
    ),
    responses(
        (status = 200, description = "Ordered chain", body = RoadBody),
        (status = 400, description = "Invalid id or variant", body = ErrorSchema),
        (status = 404, description = "Unknown road", body = ErrorSchema),
        (status = 503, description = "Segment oracle unavailable", body = ErrorSchema)
    ),
    tags = ["roads"],
    operation_id = "getRoad"
)]
#[get("/roads/{roadId}")]
pub async fn get_road(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<RoadViewParams>,
) -> ApiResult<web::Json<RoadBody>> {
    let road_id = parse_id(&path.into_inner(), FieldName::new("roadId"))?;
    let variant = parse_variant(query.variant.as_deref())?;
    let view = state.roads.get_road(road_id, variant).await?;
    Ok(web::Json(view.into()))
}

#[cfg(test)]
#[path = "roads_tests.rs"]
mod tests;
