//! In-process store backing every persistence port.
//!
//! One mutex guards all records, so each port call is atomic. Multi-row
//! chain writes replace a road's rows in a single critical section.

mod matcher;
mod riders;
mod route_graph;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use route_chain::RoadToSegment;

use crate::domain::{
    Driver, Passenger, RequestId, Road, RoadId, StagedProposal, UserId, UserProfile,
};

#[derive(Debug)]
struct RoadRecord {
    road: Road,
    active: Vec<RoadToSegment>,
    temporary: Vec<RoadToSegment>,
    proposal: Option<StagedProposal>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, UserProfile>,
    drivers: HashMap<UserId, Driver>,
    passengers: HashMap<UserId, Passenger>,
    roads: HashMap<RoadId, RoadRecord>,
    road_by_driver: HashMap<UserId, RoadId>,
    road_by_request: HashMap<RequestId, RoadId>,
}

/// Thread-safe in-memory implementation of the rider, capacity, route graph,
/// and matcher ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the store, converting poisoning into the caller's error type.
    fn lock<E>(&self, query: impl FnOnce(String) -> E) -> Result<MutexGuard<'_, StoreState>, E> {
        self.state
            .lock()
            .map_err(|_| query("in-memory store lock poisoned".to_owned()))
    }
}

#[cfg(test)]
mod tests;
