//! Driving port for user, driver, and passenger registration.

use async_trait::async_trait;

use crate::domain::{
    DepartureWindow, Error, Location, PartySize, Passenger, RoadId, SeatCapacity, UserId,
    UserProfile,
};

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
}

/// Input for registering a driver and creating their road.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterDriverRequest {
    pub user_id: UserId,
    pub location: Location,
    pub destination: Location,
    pub departure: DepartureWindow,
    pub seats: u32,
}

/// Road created for a newly registered driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDriverResponse {
    pub road_id: RoadId,
    pub capacity: SeatCapacity,
}

/// Input for registering or updating a passenger.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterPassengerRequest {
    pub user_id: UserId,
    pub location: Location,
    pub party_size: PartySize,
    pub departure: DepartureWindow,
}

/// Driving port for registration flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    async fn register_user(&self, request: RegisterUserRequest) -> Result<UserProfile, Error>;

    /// Store the driver with every seat free and seed a one-segment road.
    async fn register_driver(
        &self,
        request: RegisterDriverRequest,
    ) -> Result<RegisterDriverResponse, Error>;

    /// Insert or replace the passenger record for an existing user.
    async fn register_passenger(
        &self,
        request: RegisterPassengerRequest,
    ) -> Result<Passenger, Error>;
}
