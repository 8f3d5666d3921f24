//! Registration of users, drivers, and passengers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use route_chain::Chain;
use serde_json::json;
use tracing::info;

use crate::domain::planner::{bounded_oracle_call, map_planning_error};
use crate::domain::ports::{
    RegisterDriverRequest, RegisterDriverResponse, RegisterPassengerRequest, RegisterUserRequest,
    RegistrationCommand, RiderRepository, RouteGraphRepository, SegmentOracle,
};
use crate::domain::proposal::map_route_graph_error;
use crate::domain::ride_service_support::{RidePorts, ensure_not_riding, map_rider_error};
use crate::domain::{
    Driver, Error, Passenger, RiderValidationError, Road, RoadId, SeatCapacity, UserId,
    UserProfile,
};

fn invalid(field: &str, err: RiderValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "validation_error",
    }))
}

/// Registers riders and seeds driver roads.
#[derive(Clone)]
pub struct RegistrationService {
    riders: Arc<dyn RiderRepository>,
    graph: Arc<dyn RouteGraphRepository>,
    oracle: Arc<dyn SegmentOracle>,
    oracle_timeout: Duration,
}

impl RegistrationService {
    pub fn new(ports: &RidePorts) -> Self {
        Self {
            riders: Arc::clone(&ports.riders),
            graph: Arc::clone(&ports.graph),
            oracle: Arc::clone(&ports.oracle),
            oracle_timeout: ports.oracle_timeout,
        }
    }

    async fn require_user(&self, user_id: UserId) -> Result<UserProfile, Error> {
        self.riders
            .find_user(user_id)
            .await
            .map_err(map_rider_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl RegistrationCommand for RegistrationService {
    async fn register_user(&self, request: RegisterUserRequest) -> Result<UserProfile, Error> {
        let profile = UserProfile::new(UserId::random(), request.name, request.email).map_err(
            |err| {
                let field = if err == RiderValidationError::EmptyName {
                    "name"
                } else {
                    "email"
                };
                invalid(field, err)
            },
        )?;
        self.riders
            .save_user(&profile)
            .await
            .map_err(map_rider_error)?;
        info!(user_id = %profile.id(), "registered user");
        Ok(profile)
    }

    async fn register_driver(
        &self,
        request: RegisterDriverRequest,
    ) -> Result<RegisterDriverResponse, Error> {
        let capacity =
            SeatCapacity::new(request.seats).map_err(|err| invalid("numberOfAvailableSeats", err))?;
        self.require_user(request.user_id).await?;
        if self
            .riders
            .find_passenger(request.user_id)
            .await
            .map_err(map_rider_error)?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "user {} is registered as a passenger",
                request.user_id
            )));
        }
        if self
            .riders
            .find_driver(request.user_id)
            .await
            .map_err(map_rider_error)?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "user {} is already a driver",
                request.user_id
            )));
        }

        let segment = bounded_oracle_call(
            self.oracle_timeout,
            self.oracle
                .initial_segment(request.location, request.destination),
        )
        .await
        .map_err(map_planning_error)?;

        let driver = Driver {
            user_id: request.user_id,
            location: request.location,
            destination: request.destination,
            departure: request.departure,
            capacity,
        };
        self.riders
            .save_driver(&driver)
            .await
            .map_err(map_rider_error)?;

        let road = Road::new(RoadId::random(), driver.user_id);
        let rows = Chain::single(*road.id.as_uuid(), segment.hash).to_edges();
        self.graph
            .create_road(&road, &rows)
            .await
            .map_err(map_route_graph_error)?;

        info!(
            driver_id = %driver.user_id,
            road_id = %road.id,
            seats = capacity.total_seats(),
            "registered driver road"
        );
        Ok(RegisterDriverResponse {
            road_id: road.id,
            capacity,
        })
    }

    async fn register_passenger(
        &self,
        request: RegisterPassengerRequest,
    ) -> Result<Passenger, Error> {
        self.require_user(request.user_id).await?;
        // Party size and stop are fixed while the passenger is on a road.
        ensure_not_riding(self.riders.as_ref(), self.graph.as_ref(), request.user_id).await?;
        let passenger = Passenger {
            user_id: request.user_id,
            location: request.location,
            party_size: request.party_size,
            departure: request.departure,
        };
        self.riders
            .save_passenger(&passenger)
            .await
            .map_err(map_rider_error)?;
        info!(user_id = %passenger.user_id, party_size = passenger.party_size.get(), "registered passenger");
        Ok(passenger)
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
