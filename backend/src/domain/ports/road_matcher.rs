//! Port selecting the road a passenger request targets.

use async_trait::async_trait;

use crate::domain::{Passenger, RoadId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by road matcher adapters.
    pub enum RoadMatcherError {
        /// Matching backend failed.
        Query { message: String } => "road matching failed: {message}",
    }
}

/// Port for picking a candidate driver road.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadMatcher: Send + Sync {
    /// Road to stage the passenger on, or `None` when no driver fits.
    async fn match_road(&self, passenger: &Passenger) -> Result<Option<RoadId>, RoadMatcherError>;
}
