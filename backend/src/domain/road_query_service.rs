//! Read model for a road's active or temporary chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use route_chain::{Chain, ChainVariant};

use crate::domain::planner::{bounded_oracle_call, map_planning_error};
use crate::domain::ports::{RoadQuery, RoadSegmentView, RoadView, RouteGraphRepository, SegmentOracle};
use crate::domain::proposal::map_route_graph_error;
use crate::domain::ride_service_support::RidePorts;
use crate::domain::{Error, RoadId, SegmentCost, UserId};

#[derive(Clone)]
pub struct RoadQueryService {
    graph: Arc<dyn RouteGraphRepository>,
    oracle: Arc<dyn SegmentOracle>,
    oracle_timeout: Duration,
}

impl RoadQueryService {
    pub fn new(ports: &RidePorts) -> Self {
        Self {
            graph: Arc::clone(&ports.graph),
            oracle: Arc::clone(&ports.oracle),
            oracle_timeout: ports.oracle_timeout,
        }
    }
}

#[async_trait]
impl RoadQuery for RoadQueryService {
    async fn get_road(&self, road_id: RoadId, variant: ChainVariant) -> Result<RoadView, Error> {
        let road = self
            .graph
            .find_road(road_id)
            .await
            .map_err(map_route_graph_error)?
            .ok_or_else(|| Error::not_found(format!("road {road_id} not found")))?;
        let rows = self
            .graph
            .read_chain(road_id, variant)
            .await
            .map_err(map_route_graph_error)?;
        let request_id = match variant {
            ChainVariant::Active => None,
            ChainVariant::Temporary => self
                .graph
                .find_proposal_by_road(road_id)
                .await
                .map_err(map_route_graph_error)?
                .map(|proposal| proposal.request_id),
        };

        let mut segments = Vec::with_capacity(rows.len());
        let mut total = SegmentCost::default();
        if !rows.is_empty() {
            let chain = Chain::from_edges(*road_id.as_uuid(), rows)
                .map_err(|err| Error::internal(format!("road chain is malformed: {err}")))?;
            for link in &chain {
                let cost = bounded_oracle_call(
                    self.oracle_timeout,
                    self.oracle.segment_cost(&link.segment_hash),
                )
                .await
                .map_err(map_planning_error)?;
                total = total.plus(cost);
                segments.push(RoadSegmentView {
                    segment_hash: link.segment_hash.clone(),
                    alighting_user_id: link.alighting_user_id.map(UserId::from_uuid),
                    cost,
                });
            }
        }

        Ok(RoadView {
            road_id,
            driver_id: road.driver_id,
            variant,
            request_id,
            segments,
            total,
        })
    }
}
