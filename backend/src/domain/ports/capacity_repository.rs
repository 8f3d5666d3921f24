//! Port for atomic seat accounting.

use async_trait::async_trait;

use crate::domain::{CapacityError, SeatCapacity, SlotDelta, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by capacity repository adapters.
    pub enum CapacityRepositoryError {
        /// No driver record exists for the id.
        DriverNotFound { driver_id: String } =>
            "driver {driver_id} not found",
        /// The delta broke a capacity rule; nothing was written.
        Rejected { reason: CapacityError } =>
            "{reason}",
        /// Repository connection could not be established.
        Connection { message: String } =>
            "capacity repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "capacity repository query failed: {message}",
    }
}

/// Port applying seat deltas atomically per driver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CapacityRepository: Send + Sync {
    /// Read, check, and write the driver's capacity as one step.
    async fn apply_delta(
        &self,
        driver_id: UserId,
        delta: SlotDelta,
    ) -> Result<SeatCapacity, CapacityRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn rejected_displays_rule() {
        let err = CapacityRepositoryError::rejected(CapacityError::Exhausted {
            requested: 3,
            available: 1,
        });
        assert_eq!(
            err.to_string(),
            "not enough free seats: requested 3, available 1"
        );
    }
}
