//! Driving port for changing a driver's seat total.

use async_trait::async_trait;

use crate::domain::{Error, SeatCapacity, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverCapacityCommand: Send + Sync {
    /// Set the seat total; free slots move by the same delta.
    async fn resize_driver_capacity(
        &self,
        driver_id: UserId,
        new_seat_count: u32,
    ) -> Result<SeatCapacity, Error>;
}
