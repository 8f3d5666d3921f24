//! Road chains and staged proposals.

use async_trait::async_trait;
use route_chain::{ChainVariant, RoadToSegment};

use crate::domain::ports::{RouteGraphRepository, RouteGraphRepositoryError};
use crate::domain::{RequestId, Road, RoadId, StagedProposal, UserId};

use super::{InMemoryStore, RoadRecord, StoreState};

fn road_mut(
    state: &mut StoreState,
    road_id: RoadId,
) -> Result<&mut RoadRecord, RouteGraphRepositoryError> {
    state
        .roads
        .get_mut(&road_id)
        .ok_or_else(|| RouteGraphRepositoryError::query(format!("road {road_id} not found")))
}

/// Remove the temporary chain and proposal, returning the staged rows.
fn take_staged(
    state: &mut StoreState,
    road_id: RoadId,
) -> Result<Vec<RoadToSegment>, RouteGraphRepositoryError> {
    let record = road_mut(state, road_id)?;
    if record.temporary.is_empty() {
        return Err(RouteGraphRepositoryError::no_staged_chain(road_id));
    }
    let rows = std::mem::take(&mut record.temporary);
    if let Some(proposal) = record.proposal.take() {
        state.road_by_request.remove(&proposal.request_id);
    }
    Ok(rows)
}

#[async_trait]
impl RouteGraphRepository for InMemoryStore {
    async fn create_road(
        &self,
        road: &Road,
        rows: &[RoadToSegment],
    ) -> Result<(), RouteGraphRepositoryError> {
        let mut state = self.lock(RouteGraphRepositoryError::query)?;
        if state.roads.contains_key(&road.id) || state.road_by_driver.contains_key(&road.driver_id)
        {
            return Err(RouteGraphRepositoryError::road_exists(road.id));
        }
        state.road_by_driver.insert(road.driver_id, road.id);
        state.roads.insert(
            road.id,
            RoadRecord {
                road: *road,
                active: rows.to_vec(),
                temporary: Vec::new(),
                proposal: None,
            },
        );
        Ok(())
    }

    async fn find_road(&self, road_id: RoadId) -> Result<Option<Road>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        Ok(state.roads.get(&road_id).map(|record| record.road))
    }

    async fn find_road_by_driver(
        &self,
        driver_id: UserId,
    ) -> Result<Option<Road>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        Ok(state
            .road_by_driver
            .get(&driver_id)
            .and_then(|road_id| state.roads.get(road_id))
            .map(|record| record.road))
    }

    async fn read_chain(
        &self,
        road_id: RoadId,
        variant: ChainVariant,
    ) -> Result<Vec<RoadToSegment>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        Ok(state
            .roads
            .get(&road_id)
            .map(|record| match variant {
                ChainVariant::Active => record.active.clone(),
                ChainVariant::Temporary => record.temporary.clone(),
            })
            .unwrap_or_default())
    }

    async fn write_staged_chain(
        &self,
        proposal: &StagedProposal,
        rows: &[RoadToSegment],
    ) -> Result<(), RouteGraphRepositoryError> {
        let mut state = self.lock(RouteGraphRepositoryError::query)?;
        let record = road_mut(&mut state, proposal.road_id)?;
        record.temporary = rows.to_vec();
        let superseded = record.proposal.replace(proposal.clone());
        if let Some(old) = superseded {
            state.road_by_request.remove(&old.request_id);
        }
        state
            .road_by_request
            .insert(proposal.request_id, proposal.road_id);
        Ok(())
    }

    async fn promote_chain(&self, road_id: RoadId) -> Result<(), RouteGraphRepositoryError> {
        let mut state = self.lock(RouteGraphRepositoryError::query)?;
        let rows = take_staged(&mut state, road_id)?;
        road_mut(&mut state, road_id)?.active = rows;
        Ok(())
    }

    async fn discard_chain(&self, road_id: RoadId) -> Result<(), RouteGraphRepositoryError> {
        let mut state = self.lock(RouteGraphRepositoryError::query)?;
        take_staged(&mut state, road_id).map(|_| ())
    }

    async fn find_proposal_by_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<StagedProposal>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        Ok(state
            .road_by_request
            .get(&request_id)
            .and_then(|road_id| state.roads.get(road_id))
            .and_then(|record| record.proposal.clone()))
    }

    async fn find_proposal_by_road(
        &self,
        road_id: RoadId,
    ) -> Result<Option<StagedProposal>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        Ok(state
            .roads
            .get(&road_id)
            .and_then(|record| record.proposal.clone()))
    }

    async fn find_road_carrying(
        &self,
        user_id: UserId,
        variant: ChainVariant,
    ) -> Result<Option<RoadId>, RouteGraphRepositoryError> {
        let state = self.lock(RouteGraphRepositoryError::query)?;
        let carries = |rows: &[RoadToSegment]| {
            rows.iter()
                .any(|row| row.alighting_user_id == Some(*user_id.as_uuid()))
        };
        Ok(state
            .roads
            .values()
            .find(|record| match variant {
                ChainVariant::Active => carries(&record.active),
                ChainVariant::Temporary => carries(&record.temporary),
            })
            .map(|record| record.road.id))
    }
}
