//! Staged proposals and their lifecycle.
//!
//! A road has at most one pending proposal. Staging writes a temporary chain
//! next to the active one; restaging replaces it with a further splice and a
//! fresh request id; promotion makes it active; discard drops it.
//!
//! ```text
//! Absent --stage--> Staged --restage--> StagedUpdated --restage--> StagedUpdated
//!                     |                     |
//!                     +--promote/discard----+--> Promoted | Discarded
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use route_chain::ChainError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{RouteGraphRepository, RouteGraphRepositoryError};
use crate::domain::{Error, InsertionPlan, RequestId, RoadId, UserId};

/// Lifecycle position of a road's proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Absent,
    Staged,
    StagedUpdated,
    Promoted,
    Discarded,
}

impl ProposalState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Staged => "staged",
            Self::StagedUpdated => "staged_updated",
            Self::Promoted => "promoted",
            Self::Discarded => "discarded",
        }
    }

    /// Whether a driver decision is still outstanding.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Staged | Self::StagedUpdated)
    }

    /// Apply `event`, returning the next state.
    ///
    /// # Examples
    /// ```
    /// use ridematch::domain::{ProposalEvent, ProposalState};
    ///
    /// let staged = ProposalState::Absent.apply(ProposalEvent::Stage).expect("stage");
    /// assert_eq!(staged, ProposalState::Staged);
    /// assert!(staged.apply(ProposalEvent::Stage).is_err());
    /// ```
    pub fn apply(self, event: ProposalEvent) -> Result<Self, ProposalError> {
        match (self, event) {
            (Self::Absent, ProposalEvent::Stage) => Ok(Self::Staged),
            (Self::Staged | Self::StagedUpdated, ProposalEvent::Restage) => {
                Ok(Self::StagedUpdated)
            }
            (Self::Staged | Self::StagedUpdated, ProposalEvent::Promote) => Ok(Self::Promoted),
            (Self::Staged | Self::StagedUpdated, ProposalEvent::Discard) => Ok(Self::Discarded),
            (from, event) => Err(ProposalError::InvalidTransition { from, event }),
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation applied to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalEvent {
    Stage,
    Restage,
    Promote,
    Discard,
}

impl fmt::Display for ProposalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stage => "stage",
            Self::Restage => "restage",
            Self::Promote => "promote",
            Self::Discard => "discard",
        })
    }
}

/// Failures raised while moving a proposal through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProposalError {
    #[error("cannot {event} a proposal in state {from}")]
    InvalidTransition {
        from: ProposalState,
        event: ProposalEvent,
    },
    #[error("splice failed: {0}")]
    Splice(#[from] ChainError),
    #[error(transparent)]
    Repository(#[from] RouteGraphRepositoryError),
}

pub(crate) fn map_proposal_error(error: ProposalError) -> Error {
    match error {
        ProposalError::InvalidTransition { from, event } => {
            Error::invalid_state(format!("cannot {event} a proposal in state {from}"))
                .with_details(json!({
                    "state": from.as_str(),
                    "event": event.to_string(),
                }))
        }
        ProposalError::Splice(ChainError::DuplicateSegment { segment_hash }) => Error::conflict(
            format!("segment {segment_hash} already appears on the road"),
        ),
        ProposalError::Splice(cause) => Error::internal(format!("splice failed: {cause}")),
        ProposalError::Repository(cause) => map_route_graph_error(cause),
    }
}

pub(crate) fn map_route_graph_error(error: RouteGraphRepositoryError) -> Error {
    match error {
        RouteGraphRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("route graph unavailable: {message}"))
        }
        RouteGraphRepositoryError::Query { message } => {
            Error::internal(format!("route graph error: {message}"))
        }
        RouteGraphRepositoryError::RoadExists { road_id } => {
            Error::conflict(format!("road {road_id} already exists"))
        }
        RouteGraphRepositoryError::NoStagedChain { road_id } => {
            Error::invalid_state(format!("road {road_id} has no staged chain"))
        }
    }
}

/// A pending proposal awaiting the driver's decision.
///
/// `passengers` and the deltas are cumulative over every splice since the
/// active chain was last promoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedProposal {
    pub request_id: RequestId,
    pub road_id: RoadId,
    pub driver_id: UserId,
    pub passengers: Vec<UserId>,
    pub duration_delta_ms: i64,
    pub length_delta_m: f64,
    pub state: ProposalState,
    pub staged_at: DateTime<Utc>,
}

/// Applies lifecycle transitions and persists their chains.
///
/// Callers serialise access per road; the store itself does not lock.
#[derive(Clone)]
pub struct ProposalStore {
    graph: Arc<dyn RouteGraphRepository>,
    clock: Arc<dyn Clock>,
}

impl ProposalStore {
    pub fn new(graph: Arc<dyn RouteGraphRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { graph, clock }
    }

    async fn pending(&self, road_id: RoadId) -> Result<Option<StagedProposal>, ProposalError> {
        Ok(self.graph.find_proposal_by_road(road_id).await?)
    }

    /// Stage a first proposal from a plan against the active chain.
    pub async fn stage(
        &self,
        driver_id: UserId,
        plan: &InsertionPlan,
    ) -> Result<StagedProposal, ProposalError> {
        let from = self
            .pending(plan.road_id())
            .await?
            .map_or(ProposalState::Absent, |existing| existing.state);
        let state = from.apply(ProposalEvent::Stage)?;
        let proposal = StagedProposal {
            request_id: RequestId::random(),
            road_id: plan.road_id(),
            driver_id,
            passengers: vec![plan.passenger_id()],
            duration_delta_ms: plan.cost_difference_ms(),
            length_delta_m: plan.length_difference_m(),
            state,
            staged_at: self.clock.utc(),
        };
        self.write(plan, &proposal).await?;
        Ok(proposal)
    }

    /// Splice a further passenger into the pending proposal.
    ///
    /// The plan must have been computed against the temporary chain. The
    /// previous request id is superseded.
    pub async fn restage(&self, plan: &InsertionPlan) -> Result<StagedProposal, ProposalError> {
        let existing = self
            .pending(plan.road_id())
            .await?
            .ok_or(ProposalError::InvalidTransition {
                from: ProposalState::Absent,
                event: ProposalEvent::Restage,
            })?;
        let state = existing.state.apply(ProposalEvent::Restage)?;
        let mut passengers = existing.passengers;
        passengers.push(plan.passenger_id());
        let proposal = StagedProposal {
            request_id: RequestId::random(),
            road_id: plan.road_id(),
            driver_id: existing.driver_id,
            passengers,
            duration_delta_ms: existing
                .duration_delta_ms
                .saturating_add(plan.cost_difference_ms()),
            length_delta_m: existing.length_delta_m + plan.length_difference_m(),
            state,
            staged_at: self.clock.utc(),
        };
        self.write(plan, &proposal).await?;
        Ok(proposal)
    }

    async fn write(
        &self,
        plan: &InsertionPlan,
        proposal: &StagedProposal,
    ) -> Result<(), ProposalError> {
        let spliced = plan.chain().splice(
            plan.best_segment_hash(),
            plan.replacement().pair(),
            *plan.passenger_id().as_uuid(),
        )?;
        self.graph
            .write_staged_chain(proposal, &spliced.to_edges())
            .await?;
        info!(
            road_id = %proposal.road_id,
            request_id = %proposal.request_id,
            state = %proposal.state,
            segment_hash = %plan.best_segment_hash(),
            "staged proposal"
        );
        Ok(())
    }

    /// Make the temporary chain active.
    pub async fn promote(&self, road_id: RoadId) -> Result<StagedProposal, ProposalError> {
        self.resolve(road_id, ProposalEvent::Promote).await
    }

    /// Drop the temporary chain, leaving the active chain untouched.
    pub async fn discard(&self, road_id: RoadId) -> Result<StagedProposal, ProposalError> {
        self.resolve(road_id, ProposalEvent::Discard).await
    }

    async fn resolve(
        &self,
        road_id: RoadId,
        event: ProposalEvent,
    ) -> Result<StagedProposal, ProposalError> {
        let existing = self
            .pending(road_id)
            .await?
            .ok_or(ProposalError::InvalidTransition {
                from: ProposalState::Absent,
                event,
            })?;
        let state = existing.state.apply(event)?;
        match event {
            ProposalEvent::Promote => self.graph.promote_chain(road_id).await?,
            _ => self.graph.discard_chain(road_id).await?,
        }
        info!(
            road_id = %road_id,
            request_id = %existing.request_id,
            state = %state,
            "resolved proposal"
        );
        Ok(StagedProposal { state, ..existing })
    }
}

#[cfg(test)]
#[path = "proposal_tests.rs"]
mod tests;
