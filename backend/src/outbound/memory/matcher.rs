//! Nearest-driver road matching.

use async_trait::async_trait;

use crate::domain::ports::{RoadMatcher, RoadMatcherError};
use crate::domain::{Passenger, RoadId};

use super::InMemoryStore;

#[async_trait]
impl RoadMatcher for InMemoryStore {
    /// Pick the road of the closest driver whose departure window overlaps
    /// the passenger's and who still has enough free seats.
    async fn match_road(&self, passenger: &Passenger) -> Result<Option<RoadId>, RoadMatcherError> {
        let state = self.lock(RoadMatcherError::query)?;
        let best = state
            .drivers
            .values()
            .filter(|driver| driver.user_id != passenger.user_id)
            .filter(|driver| driver.departure.overlaps(&passenger.departure))
            .filter(|driver| driver.capacity.available_slots() >= passenger.party_size.get())
            .filter_map(|driver| {
                state
                    .road_by_driver
                    .get(&driver.user_id)
                    .map(|road_id| (*road_id, driver.location.distance_m(&passenger.location)))
            })
            .min_by(|(left_id, left), (right_id, right)| {
                left.total_cmp(right).then_with(|| left_id.cmp(right_id))
            });
        Ok(best.map(|(road_id, _)| road_id))
    }
}
