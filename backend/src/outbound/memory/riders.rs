//! Rider records and seat accounting.

use async_trait::async_trait;

use crate::domain::ports::{
    CapacityRepository, CapacityRepositoryError, RiderRepository, RiderRepositoryError,
};
use crate::domain::{Driver, Passenger, SeatCapacity, SlotDelta, UserId, UserProfile};

use super::InMemoryStore;

#[async_trait]
impl RiderRepository for InMemoryStore {
    async fn save_user(&self, user: &UserProfile) -> Result<(), RiderRepositoryError> {
        let mut state = self.lock(RiderRepositoryError::query)?;
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserProfile>, RiderRepositoryError> {
        let state = self.lock(RiderRepositoryError::query)?;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn save_driver(&self, driver: &Driver) -> Result<(), RiderRepositoryError> {
        let mut state = self.lock(RiderRepositoryError::query)?;
        state.drivers.insert(driver.user_id, driver.clone());
        Ok(())
    }

    async fn find_driver(&self, user_id: UserId) -> Result<Option<Driver>, RiderRepositoryError> {
        let state = self.lock(RiderRepositoryError::query)?;
        Ok(state.drivers.get(&user_id).cloned())
    }

    async fn save_passenger(&self, passenger: &Passenger) -> Result<(), RiderRepositoryError> {
        let mut state = self.lock(RiderRepositoryError::query)?;
        state.passengers.insert(passenger.user_id, passenger.clone());
        Ok(())
    }

    async fn find_passenger(
        &self,
        user_id: UserId,
    ) -> Result<Option<Passenger>, RiderRepositoryError> {
        let state = self.lock(RiderRepositoryError::query)?;
        Ok(state.passengers.get(&user_id).cloned())
    }
}

#[async_trait]
impl CapacityRepository for InMemoryStore {
    async fn apply_delta(
        &self,
        driver_id: UserId,
        delta: SlotDelta,
    ) -> Result<SeatCapacity, CapacityRepositoryError> {
        let mut state = self.lock(CapacityRepositoryError::query)?;
        let driver = state
            .drivers
            .get_mut(&driver_id)
            .ok_or_else(|| CapacityRepositoryError::driver_not_found(driver_id))?;
        let capacity = driver
            .capacity
            .apply(delta)
            .map_err(CapacityRepositoryError::rejected)?;
        driver.capacity = capacity;
        Ok(capacity)
    }
}
