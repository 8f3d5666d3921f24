//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (oracle, repositories, matcher, notifier) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented by
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod capacity_repository;
mod driver_capacity_command;
mod notifier;
mod passenger_road_command;
mod registration_command;
mod rider_repository;
mod road_decision_command;
mod road_matcher;
mod road_query;
mod route_graph_repository;
mod segment_oracle;

#[cfg(test)]
pub use capacity_repository::MockCapacityRepository;
pub use capacity_repository::{CapacityRepository, CapacityRepositoryError};
#[cfg(test)]
pub use driver_capacity_command::MockDriverCapacityCommand;
pub use driver_capacity_command::DriverCapacityCommand;
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{DeliveryStatus, Notifier};
#[cfg(test)]
pub use passenger_road_command::MockPassengerRoadCommand;
pub use passenger_road_command::{PassengerRoadCommand, PassengerRoadResponse};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{
    RegisterDriverRequest, RegisterDriverResponse, RegisterPassengerRequest, RegisterUserRequest,
    RegistrationCommand,
};
#[cfg(test)]
pub use rider_repository::MockRiderRepository;
pub use rider_repository::{RiderRepository, RiderRepositoryError};
#[cfg(test)]
pub use road_decision_command::MockRoadDecisionCommand;
pub use road_decision_command::{
    Decision, RoadDecisionCommand, RoadDecisionRequest, RoadDecisionResponse,
};
#[cfg(test)]
pub use road_matcher::MockRoadMatcher;
pub use road_matcher::{RoadMatcher, RoadMatcherError};
#[cfg(test)]
pub use road_query::MockRoadQuery;
pub use road_query::{RoadQuery, RoadSegmentView, RoadView};
#[cfg(test)]
pub use route_graph_repository::MockRouteGraphRepository;
pub use route_graph_repository::{RouteGraphRepository, RouteGraphRepositoryError};
#[cfg(test)]
pub use segment_oracle::MockSegmentOracle;
pub use segment_oracle::{SegmentOracle, SegmentOracleError};
