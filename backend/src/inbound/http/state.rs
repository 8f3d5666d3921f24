//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and stay testable with mocks.

use std::sync::Arc;

use crate::domain::ports::{
    DriverCapacityCommand, PassengerRoadCommand, RegistrationCommand, RoadDecisionCommand,
    RoadQuery,
};

/// Parameter object bundling the driving ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn RegistrationCommand>,
    pub passenger_roads: Arc<dyn PassengerRoadCommand>,
    pub decisions: Arc<dyn RoadDecisionCommand>,
    pub capacity: Arc<dyn DriverCapacityCommand>,
    pub roads: Arc<dyn RoadQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationCommand>,
    pub passenger_roads: Arc<dyn PassengerRoadCommand>,
    pub decisions: Arc<dyn RoadDecisionCommand>,
    pub capacity: Arc<dyn DriverCapacityCommand>,
    pub roads: Arc<dyn RoadQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use ridematch::domain::{
    ///     CapacityLedger, PassengerRoadService, RegistrationService, RidePorts,
    ///     RoadDecisionService, RoadQueryService,
    /// };
    /// use ridematch::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn build(ports: &RidePorts) -> HttpState {
    ///     HttpState::new(HttpStatePorts {
    ///         registration: Arc::new(RegistrationService::new(ports)),
    ///         passenger_roads: Arc::new(PassengerRoadService::new(ports)),
    ///         decisions: Arc::new(RoadDecisionService::new(ports)),
    ///         capacity: Arc::new(CapacityLedger::new(ports.capacity.clone())),
    ///         roads: Arc::new(RoadQueryService::new(ports)),
    ///     })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            registration,
            passenger_roads,
            decisions,
            capacity,
            roads,
        } = ports;
        Self {
            registration,
            passenger_roads,
            decisions,
            capacity,
            roads,
        }
    }
}
