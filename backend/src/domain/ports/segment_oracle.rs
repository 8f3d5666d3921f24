//! Port for the routing engine that prices and splits segments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use route_chain::SegmentHash;

use crate::domain::{Location, Segment, SegmentCost, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by segment oracle adapters.
    pub enum SegmentOracleError {
        /// The oracle has never produced this segment.
        UnknownSegment { segment_hash: String } =>
            "segment {segment_hash} is unknown to the oracle",
        /// The passenger's stop could not be resolved.
        UnknownPassenger { passenger_id: String } =>
            "passenger {passenger_id} has no known location",
        /// The routing engine could not be reached or failed internally.
        Unavailable { message: String } =>
            "segment oracle unavailable: {message}",
    }
}

/// Opaque segment cost and geometry oracle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentOracle: Send + Sync {
    /// Duration and length of an existing segment.
    async fn segment_cost(&self, segment_hash: &SegmentHash)
    -> Result<SegmentCost, SegmentOracleError>;

    /// Split a segment at the passenger's stop.
    ///
    /// Returns segments keyed by sequence number: 1 ends at the stop, 2
    /// continues to the original segment's end.
    async fn split_segment(
        &self,
        segment_hash: &SegmentHash,
        passenger_id: UserId,
    ) -> Result<BTreeMap<u32, Segment>, SegmentOracleError>;

    /// Single segment from `from` to `to`, used to seed a new road.
    async fn initial_segment(
        &self,
        from: Location,
        to: Location,
    ) -> Result<Segment, SegmentOracleError>;
}
