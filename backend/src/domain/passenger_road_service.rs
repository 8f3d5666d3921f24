//! Passenger road requests: match, plan, stage, reserve, notify.

use std::sync::Arc;

use async_trait::async_trait;
use route_chain::ChainVariant;
use tracing::{info, warn};

use crate::domain::planner::map_planning_error;
use crate::domain::ports::{
    DeliveryStatus, PassengerRoadCommand, PassengerRoadResponse, RiderRepository, RoadMatcher,
    RouteGraphRepository,
};
use crate::domain::proposal::{map_proposal_error, map_route_graph_error};
use crate::domain::ride_service_support::{
    RidePorts, ensure_not_riding, load_contacts, map_matcher_error, map_rider_error,
};
use crate::domain::{
    CapacityLedger, Error, InsertionPlanner, Notification, NotificationDispatcher, Passenger,
    ProposalStore, Road, RoadLocks, StagedProposal, UserId,
};

/// Stages a passenger onto the best matching driver road.
#[derive(Clone)]
pub struct PassengerRoadService {
    riders: Arc<dyn RiderRepository>,
    graph: Arc<dyn RouteGraphRepository>,
    matcher: Arc<dyn RoadMatcher>,
    planner: InsertionPlanner,
    proposals: ProposalStore,
    ledger: CapacityLedger,
    notifications: NotificationDispatcher,
    locks: Arc<RoadLocks>,
}

impl PassengerRoadService {
    pub fn new(ports: &RidePorts) -> Self {
        Self {
            riders: Arc::clone(&ports.riders),
            graph: Arc::clone(&ports.graph),
            matcher: Arc::clone(&ports.matcher),
            planner: InsertionPlanner::new(Arc::clone(&ports.oracle), ports.oracle_timeout),
            proposals: ProposalStore::new(Arc::clone(&ports.graph), Arc::clone(&ports.clock)),
            ledger: CapacityLedger::new(Arc::clone(&ports.capacity)),
            notifications: NotificationDispatcher::new(Arc::clone(&ports.notifier)),
            locks: Arc::clone(&ports.locks),
        }
    }

    async fn matched_road(&self, passenger: &Passenger) -> Result<Road, Error> {
        let road_id = self
            .matcher
            .match_road(passenger)
            .await
            .map_err(map_matcher_error)?
            .ok_or_else(|| Error::not_found("no driver road matches the passenger"))?;
        self.graph
            .find_road(road_id)
            .await
            .map_err(map_route_graph_error)?
            .ok_or_else(|| Error::not_found(format!("road {road_id} not found")))
    }

    /// Plan against the temporary chain when one exists, otherwise against
    /// the active chain, then reserve the party's seats. Runs under the
    /// road's lock.
    async fn plan_and_stage(&self, road: Road, passenger: &Passenger) -> Result<StagedProposal, Error> {
        let _guard = self.locks.acquire(road.id).await;
        let proposal = self.stage_under_lock(road, passenger.user_id).await?;
        // The staged chain stays in place if the seats no longer fit.
        self.ledger
            .reserve(road.driver_id, passenger.party_size)
            .await?;
        Ok(proposal)
    }

    async fn stage_under_lock(&self, road: Road, passenger_id: UserId) -> Result<StagedProposal, Error> {
        let temporary = self
            .graph
            .read_chain(road.id, ChainVariant::Temporary)
            .await
            .map_err(map_route_graph_error)?;
        if temporary.is_empty() {
            let active = self
                .graph
                .read_chain(road.id, ChainVariant::Active)
                .await
                .map_err(map_route_graph_error)?;
            let plan = self
                .planner
                .plan(road.id, passenger_id, active)
                .await
                .map_err(map_planning_error)?;
            self.proposals
                .stage(road.driver_id, &plan)
                .await
                .map_err(map_proposal_error)
        } else {
            let plan = self
                .planner
                .plan(road.id, passenger_id, temporary)
                .await
                .map_err(map_planning_error)?;
            self.proposals
                .restage(&plan)
                .await
                .map_err(map_proposal_error)
        }
    }
}

#[async_trait]
impl PassengerRoadCommand for PassengerRoadService {
    async fn create_passenger_road(
        &self,
        passenger_id: UserId,
    ) -> Result<PassengerRoadResponse, Error> {
        let passenger = self
            .riders
            .find_passenger(passenger_id)
            .await
            .map_err(map_rider_error)?
            .ok_or_else(|| Error::not_found(format!("passenger {passenger_id} not found")))?;
        ensure_not_riding(self.riders.as_ref(), self.graph.as_ref(), passenger_id).await?;

        let road = self.matched_road(&passenger).await?;
        let proposal = self.plan_and_stage(road, &passenger).await?;

        let passengers = load_contacts(self.riders.as_ref(), &proposal.passengers).await?;
        let status = self.notifications.notify_driver(
            road.driver_id,
            &Notification::NewProposition {
                request_id: proposal.request_id,
                passengers,
                length_delta_m: proposal.length_delta_m,
                duration_delta_ms: proposal.duration_delta_ms,
            },
        );
        if status == DeliveryStatus::Dropped {
            warn!(driver_id = %road.driver_id, request_id = %proposal.request_id, "driver offline");
        }

        info!(
            road_id = %road.id,
            request_id = %proposal.request_id,
            passenger_id = %passenger_id,
            state = %proposal.state,
            "passenger road staged"
        );
        Ok(PassengerRoadResponse {
            request_id: proposal.request_id,
            road_id: road.id,
            state: proposal.state,
        })
    }
}

#[cfg(test)]
#[path = "passenger_road_service_tests.rs"]
mod tests;
