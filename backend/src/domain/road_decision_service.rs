//! Decision resolver: applies a driver's accept or reject to a proposal.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    Decision, DeliveryStatus, RiderRepository, RoadDecisionCommand, RoadDecisionRequest,
    RoadDecisionResponse, RouteGraphRepository,
};
use crate::domain::proposal::{map_proposal_error, map_route_graph_error};
use crate::domain::ride_service_support::{RidePorts, map_rider_error};
use crate::domain::{
    CapacityLedger, Contact, Error, Notification, NotificationDispatcher, PartySize,
    ProposalStore, RoadLocks, StagedProposal, UserId,
};

/// Resolves pending proposals on behalf of their driver.
#[derive(Clone)]
pub struct RoadDecisionService {
    riders: Arc<dyn RiderRepository>,
    graph: Arc<dyn RouteGraphRepository>,
    proposals: ProposalStore,
    ledger: CapacityLedger,
    notifications: NotificationDispatcher,
    locks: Arc<RoadLocks>,
}

impl RoadDecisionService {
    pub fn new(ports: &RidePorts) -> Self {
        Self {
            riders: Arc::clone(&ports.riders),
            graph: Arc::clone(&ports.graph),
            proposals: ProposalStore::new(Arc::clone(&ports.graph), Arc::clone(&ports.clock)),
            ledger: CapacityLedger::new(Arc::clone(&ports.capacity)),
            notifications: NotificationDispatcher::new(Arc::clone(&ports.notifier)),
            locks: Arc::clone(&ports.locks),
        }
    }

    async fn pending_proposal(&self, request: &RoadDecisionRequest) -> Result<StagedProposal, Error> {
        self.graph
            .find_proposal_by_request(request.request_id)
            .await
            .map_err(map_route_graph_error)?
            .ok_or_else(|| {
                Error::not_found(format!("request {} not found", request.request_id))
            })
    }

    /// Party sizes of the pending passengers, in proposal order.
    async fn parties(&self, passengers: &[UserId]) -> Result<Vec<(UserId, PartySize)>, Error> {
        let mut parties = Vec::with_capacity(passengers.len());
        for passenger_id in passengers {
            let passenger = self
                .riders
                .find_passenger(*passenger_id)
                .await
                .map_err(map_rider_error)?
                .ok_or_else(|| {
                    Error::internal(format!("pending passenger {passenger_id} has no record"))
                })?;
            parties.push((*passenger_id, passenger.party_size));
        }
        Ok(parties)
    }

    async fn accept(&self, proposal: &StagedProposal) -> Result<usize, Error> {
        let driver = self
            .riders
            .find_user(proposal.driver_id)
            .await
            .map_err(map_rider_error)?
            .ok_or_else(|| Error::internal(format!("driver {} has no profile", proposal.driver_id)))?;
        self.proposals
            .promote(proposal.road_id)
            .await
            .map_err(map_proposal_error)?;
        let notification = Notification::RoadAccepted {
            driver: Contact::from(&driver),
        };
        Ok(self
            .notifications
            .notify_passengers(&proposal.passengers, &notification))
    }

    /// Seats held by the whole proposal, released as one delta.
    fn held_seats(parties: &[(UserId, PartySize)]) -> Result<Option<PartySize>, Error> {
        let total = parties
            .iter()
            .try_fold(0_u32, |sum, (_, party)| sum.checked_add(party.get()))
            .ok_or_else(|| Error::internal("pending party sizes overflow"))?;
        Ok(PartySize::new(total).ok())
    }

    async fn reject(&self, proposal: &StagedProposal) -> Result<usize, Error> {
        let parties = self.parties(&proposal.passengers).await?;
        let held = Self::held_seats(&parties)?;
        if let Some(seats) = held {
            self.ledger.release(proposal.driver_id, seats).await?;
        }
        if let Err(err) = self.proposals.discard(proposal.road_id).await {
            if let Some(seats) = held
                && let Err(restore) = self.ledger.reserve(proposal.driver_id, seats).await
            {
                warn!(
                    driver_id = %proposal.driver_id,
                    seats = seats.get(),
                    error = %restore,
                    "could not restore seats after failed discard"
                );
            }
            return Err(map_proposal_error(err));
        }
        let mut delivered = 0;
        for (passenger_id, _) in parties {
            delivered += usize::from(
                self.notifications
                    .notify_passenger(passenger_id, &Notification::RoadRejected)
                    == DeliveryStatus::Delivered,
            );
        }
        Ok(delivered)
    }
}

#[async_trait]
impl RoadDecisionCommand for RoadDecisionService {
    async fn resolve_decision(
        &self,
        request: RoadDecisionRequest,
    ) -> Result<RoadDecisionResponse, Error> {
        let decision: Decision = request.decision.parse()?;
        self.riders
            .find_driver(request.driver_id)
            .await
            .map_err(map_rider_error)?
            .ok_or_else(|| Error::not_found(format!("driver {} not found", request.driver_id)))?;

        let claimed = self.pending_proposal(&request).await?;
        if claimed.driver_id != request.driver_id {
            return Err(Error::forbidden(format!(
                "request {} belongs to another driver",
                request.request_id
            )));
        }

        let _guard = self.locks.acquire(claimed.road_id).await;
        // A concurrent restage or decision may have superseded the id.
        let proposal = self.pending_proposal(&request).await?;

        let delivered = match decision {
            Decision::Accept => self.accept(&proposal).await?,
            Decision::Reject => self.reject(&proposal).await?,
        };

        info!(
            road_id = %proposal.road_id,
            request_id = %proposal.request_id,
            %decision,
            passengers = proposal.passengers.len(),
            delivered,
            "resolved driver decision"
        );
        Ok(RoadDecisionResponse {
            request_id: proposal.request_id,
            road_id: proposal.road_id,
            decision,
            passengers: proposal.passengers,
            delivered,
        })
    }
}

#[cfg(test)]
#[path = "road_decision_service_tests.rs"]
mod tests;
