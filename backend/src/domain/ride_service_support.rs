//! Shared wiring and error mapping for the ride services.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use route_chain::ChainVariant;
use tracing::warn;

use crate::domain::ports::{
    CapacityRepository, Notifier, RiderRepository, RiderRepositoryError, RoadMatcher,
    RoadMatcherError, RouteGraphRepository, SegmentOracle,
};
use crate::domain::proposal::map_route_graph_error;
use crate::domain::{Contact, Error, RoadLocks, UserId};

/// Parameter object bundling the driven ports the ride services share.
#[derive(Clone)]
pub struct RidePorts {
    pub riders: Arc<dyn RiderRepository>,
    pub graph: Arc<dyn RouteGraphRepository>,
    pub capacity: Arc<dyn CapacityRepository>,
    pub matcher: Arc<dyn RoadMatcher>,
    pub oracle: Arc<dyn SegmentOracle>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    /// Shared by every service that rewrites a road's chains.
    pub locks: Arc<RoadLocks>,
    pub oracle_timeout: Duration,
}

pub(crate) fn map_rider_error(error: RiderRepositoryError) -> Error {
    match error {
        RiderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rider store unavailable: {message}"))
        }
        RiderRepositoryError::Query { message } => {
            Error::internal(format!("rider store error: {message}"))
        }
    }
}

pub(crate) fn map_matcher_error(error: RoadMatcherError) -> Error {
    match error {
        RoadMatcherError::Query { message } => {
            Error::internal(format!("road matching failed: {message}"))
        }
    }
}

/// Contacts for `user_ids` in the given order. Users without a profile are
/// skipped.
pub(crate) async fn load_contacts(
    riders: &dyn RiderRepository,
    user_ids: &[UserId],
) -> Result<Vec<Contact>, Error> {
    let mut contacts = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        match riders.find_user(*user_id).await.map_err(map_rider_error)? {
            Some(profile) => contacts.push(Contact::from(&profile)),
            None => warn!(user_id = %user_id, "no profile for pending passenger"),
        }
    }
    Ok(contacts)
}

/// Conflict when `user_id` drives, is pending on a proposal, or already rides.
pub(crate) async fn ensure_not_riding(
    riders: &dyn RiderRepository,
    graph: &dyn RouteGraphRepository,
    user_id: UserId,
) -> Result<(), Error> {
    if riders
        .find_driver(user_id)
        .await
        .map_err(map_rider_error)?
        .is_some()
    {
        return Err(Error::conflict(format!(
            "user {user_id} is registered as a driver"
        )));
    }
    for (variant, what) in [
        (ChainVariant::Temporary, "already pending on a proposal"),
        (ChainVariant::Active, "already on a road"),
    ] {
        if let Some(road_id) = graph
            .find_road_carrying(user_id, variant)
            .await
            .map_err(map_route_graph_error)?
        {
            return Err(Error::conflict(format!(
                "passenger {user_id} is {what} ({road_id})"
            )));
        }
    }
    Ok(())
}
