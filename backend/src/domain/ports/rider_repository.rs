//! Port for user, driver, and passenger records.

use async_trait::async_trait;

use crate::domain::{Driver, Passenger, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rider repository adapters.
    pub enum RiderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "rider repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "rider repository query failed: {message}",
    }
}

/// Port for rider persistence.
///
/// Driver seat counts are only written through
/// [`super::CapacityRepository`]; `save_driver` is used at registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiderRepository: Send + Sync {
    async fn save_user(&self, user: &UserProfile) -> Result<(), RiderRepositoryError>;

    async fn find_user(&self, user_id: UserId)
    -> Result<Option<UserProfile>, RiderRepositoryError>;

    async fn save_driver(&self, driver: &Driver) -> Result<(), RiderRepositoryError>;

    async fn find_driver(&self, user_id: UserId) -> Result<Option<Driver>, RiderRepositoryError>;

    /// Insert or replace a passenger record.
    async fn save_passenger(&self, passenger: &Passenger) -> Result<(), RiderRepositoryError>;

    async fn find_passenger(
        &self,
        user_id: UserId,
    ) -> Result<Option<Passenger>, RiderRepositoryError>;
}
