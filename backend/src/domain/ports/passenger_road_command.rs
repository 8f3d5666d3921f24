//! Driving port for staging a passenger onto a driver's road.

use async_trait::async_trait;

use crate::domain::{Error, ProposalState, RequestId, RoadId, UserId};

/// Result of a successful passenger road request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassengerRoadResponse {
    /// Request id the driver decides on.
    pub request_id: RequestId,
    /// Road the passenger was spliced into.
    pub road_id: RoadId,
    /// `Staged` for a fresh proposal, `StagedUpdated` when it superseded one.
    pub state: ProposalState,
}

/// Driving port for passenger road requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassengerRoadCommand: Send + Sync {
    /// Plan, stage, reserve, and notify for a registered passenger.
    async fn create_passenger_road(
        &self,
        passenger_id: UserId,
    ) -> Result<PassengerRoadResponse, Error>;
}
