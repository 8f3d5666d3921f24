//! Domain primitives, services, and ports.
//!
//! Purpose: model riders, roads, and staged proposals, and orchestrate the
//! passenger insertion and driver decision flows against driven ports. Types
//! are transport agnostic; inbound adapters map them to HTTP and WebSocket
//! payloads.
//!
//! Public surface:
//! - Error, ErrorCode: API error payload and stable identifiers.
//! - UserId, RoadId, RequestId: validated identifiers.
//! - InsertionPlanner: cheapest insertion point for a passenger.
//! - ProposalStore: staged proposal lifecycle.
//! - CapacityLedger: seat accounting.
//! - PassengerRoadService, RoadDecisionService, RegistrationService,
//!   RoadQueryService: driving port implementations.

pub mod capacity;
pub mod error;
pub mod ids;
pub mod notifications;
pub mod passenger_road_service;
pub mod planner;
pub mod ports;
pub mod proposal;
pub mod registration_service;
pub mod ride_service_support;
#[cfg(test)]
pub(crate) mod ride_service_test_support;
pub mod riders;
pub mod road;
pub mod road_decision_service;
pub mod road_locks;
pub mod road_query_service;
pub mod segment;
pub mod trace_id;

pub use self::capacity::CapacityLedger;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IdValidationError, RequestId, RoadId, UserId};
pub use self::notifications::{Contact, Notification, NotificationDispatcher};
pub use self::passenger_road_service::PassengerRoadService;
pub use self::planner::{InsertionPlan, InsertionPlanner, PlanningError};
pub use self::proposal::{
    ProposalError, ProposalEvent, ProposalState, ProposalStore, StagedProposal,
};
pub use self::registration_service::RegistrationService;
pub use self::ride_service_support::RidePorts;
pub use self::riders::{
    CapacityError, DepartureWindow, Driver, Location, PartySize, Passenger, RiderValidationError,
    Role, SeatCapacity, SlotDelta, UserProfile,
};
pub use self::road::Road;
pub use self::road_decision_service::RoadDecisionService;
pub use self::road_locks::{RoadGuard, RoadLocks};
pub use self::road_query_service::RoadQueryService;
pub use self::segment::{ReplacementSegments, Segment, SegmentCost, SplitError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use ridematch::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
