//! Port for road chains, staged proposals, and their rows.
//!
//! Rows are returned unordered; callers reconstruct order with
//! [`route_chain::Chain::from_edges`]. Writes that touch several rows are
//! atomic per road.

use async_trait::async_trait;
use route_chain::{ChainVariant, RoadToSegment};

use crate::domain::{RequestId, Road, RoadId, StagedProposal, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by route graph repository adapters.
    pub enum RouteGraphRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "route graph repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "route graph repository query failed: {message}",
        /// A road already exists for this id or driver.
        RoadExists { road_id: String } =>
            "road {road_id} already exists",
        /// Promote or discard found no temporary rows.
        NoStagedChain { road_id: String } =>
            "road {road_id} has no staged chain",
    }
}

/// Port for reading and rewriting road chains.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteGraphRepository: Send + Sync {
    /// Create a road with its initial active rows.
    async fn create_road(
        &self,
        road: &Road,
        rows: &[RoadToSegment],
    ) -> Result<(), RouteGraphRepositoryError>;

    /// Find a road by id.
    async fn find_road(&self, road_id: RoadId) -> Result<Option<Road>, RouteGraphRepositoryError>;

    /// Find the road owned by a driver.
    async fn find_road_by_driver(
        &self,
        driver_id: UserId,
    ) -> Result<Option<Road>, RouteGraphRepositoryError>;

    /// Load the unordered rows of one chain variant.
    ///
    /// An empty temporary result means no proposal is pending.
    async fn read_chain(
        &self,
        road_id: RoadId,
        variant: ChainVariant,
    ) -> Result<Vec<RoadToSegment>, RouteGraphRepositoryError>;

    /// Replace the road's temporary rows and proposal record.
    ///
    /// Any previous request id for the road stops resolving.
    async fn write_staged_chain(
        &self,
        proposal: &StagedProposal,
        rows: &[RoadToSegment],
    ) -> Result<(), RouteGraphRepositoryError>;

    /// Replace active rows with temporary rows and clear the proposal.
    async fn promote_chain(&self, road_id: RoadId) -> Result<(), RouteGraphRepositoryError>;

    /// Clear temporary rows and the proposal, leaving active rows intact.
    async fn discard_chain(&self, road_id: RoadId) -> Result<(), RouteGraphRepositoryError>;

    /// Resolve a pending proposal by its current request id.
    async fn find_proposal_by_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<StagedProposal>, RouteGraphRepositoryError>;

    /// Pending proposal for a road, if any.
    async fn find_proposal_by_road(
        &self,
        road_id: RoadId,
    ) -> Result<Option<StagedProposal>, RouteGraphRepositoryError>;

    /// Road whose chain of `variant` has a stop for `user_id`.
    async fn find_road_carrying(
        &self,
        user_id: UserId,
        variant: ChainVariant,
    ) -> Result<Option<RoadId>, RouteGraphRepositoryError>;
}
