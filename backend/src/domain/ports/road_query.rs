//! Driving port for inspecting a road's ordered chain.

use async_trait::async_trait;
use route_chain::{ChainVariant, SegmentHash};

use crate::domain::{Error, RequestId, RoadId, SegmentCost, UserId};

/// One priced position in an ordered chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegmentView {
    pub segment_hash: SegmentHash,
    pub alighting_user_id: Option<UserId>,
    pub cost: SegmentCost,
}

/// Ordered chain with totals.
///
/// A temporary view with no pending proposal has no segments and no
/// request id.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadView {
    pub road_id: RoadId,
    pub driver_id: UserId,
    pub variant: ChainVariant,
    pub request_id: Option<RequestId>,
    pub segments: Vec<RoadSegmentView>,
    pub total: SegmentCost,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadQuery: Send + Sync {
    async fn get_road(&self, road_id: RoadId, variant: ChainVariant) -> Result<RoadView, Error>;
}
