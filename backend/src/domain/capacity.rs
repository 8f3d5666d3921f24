//! Capacity ledger: the only writer of driver seat counts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{CapacityRepository, CapacityRepositoryError, DriverCapacityCommand};
use crate::domain::{CapacityError, Error, PartySize, SeatCapacity, SlotDelta, UserId};

fn map_capacity_error(error: CapacityRepositoryError) -> Error {
    match error {
        CapacityRepositoryError::DriverNotFound { driver_id } => {
            Error::not_found(format!("driver {driver_id} not found"))
        }
        CapacityRepositoryError::Rejected { reason } => {
            let details = match &reason {
                CapacityError::Exhausted {
                    requested,
                    available,
                } => json!({ "code": "seats_exhausted", "requested": requested, "available": available }),
                CapacityError::OverRelease {
                    released,
                    total_seats,
                } => json!({ "code": "over_release", "released": released, "totalSeats": total_seats }),
                CapacityError::BelowCommitted {
                    requested_total,
                    committed,
                } => json!({ "code": "exceeds_capacity", "requested": requested_total, "committed": committed }),
                CapacityError::ZeroSeats => json!({ "code": "zero_seats" }),
            };
            Error::conflict(reason.to_string()).with_details(details)
        }
        CapacityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("capacity store unavailable: {message}"))
        }
        CapacityRepositoryError::Query { message } => {
            Error::internal(format!("capacity store error: {message}"))
        }
    }
}

/// Serialises seat changes per driver through [`CapacityRepository`].
#[derive(Clone)]
pub struct CapacityLedger {
    repo: Arc<dyn CapacityRepository>,
}

impl CapacityLedger {
    pub fn new(repo: Arc<dyn CapacityRepository>) -> Self {
        Self { repo }
    }

    async fn apply(&self, driver_id: UserId, delta: SlotDelta) -> Result<SeatCapacity, Error> {
        let capacity = self
            .repo
            .apply_delta(driver_id, delta)
            .await
            .map_err(map_capacity_error)?;
        info!(
            driver_id = %driver_id,
            ?delta,
            total_seats = capacity.total_seats(),
            available_slots = capacity.available_slots(),
            "applied seat delta"
        );
        Ok(capacity)
    }

    /// Take slots for a pending party; fails with conflict when they do not fit.
    pub async fn reserve(&self, driver_id: UserId, party: PartySize) -> Result<SeatCapacity, Error> {
        self.apply(driver_id, SlotDelta::Reserve(party)).await
    }

    pub async fn release(&self, driver_id: UserId, party: PartySize) -> Result<SeatCapacity, Error> {
        self.apply(driver_id, SlotDelta::Release(party)).await
    }

    pub async fn resize(&self, driver_id: UserId, new_total: u32) -> Result<SeatCapacity, Error> {
        self.apply(driver_id, SlotDelta::Resize(new_total)).await
    }
}

#[async_trait]
impl DriverCapacityCommand for CapacityLedger {
    async fn resize_driver_capacity(
        &self,
        driver_id: UserId,
        new_seat_count: u32,
    ) -> Result<SeatCapacity, Error> {
        self.resize(driver_id, new_seat_count).await
    }
}
