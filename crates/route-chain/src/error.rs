//! Error types for the route-chain crate.
//!
//! Chain reconstruction and splicing report structural problems with the
//! offending segment hash so callers can log or surface them verbatim.

use thiserror::Error;
use uuid::Uuid;

use crate::SegmentHash;

/// Errors raised when validating a segment hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentHashError {
    /// The hash is empty.
    #[error("segment hash must not be empty")]
    Empty,

    /// The hash contains whitespace or control characters.
    #[error("segment hash contains invalid characters: {value:?}")]
    InvalidCharacters {
        /// The rejected input.
        value: String,
    },
}

/// Structural errors for chains of `RoadToSegment` rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// No rows were provided for the road.
    #[error("road {road_id} has no segments")]
    Empty {
        /// Road whose chain was requested.
        road_id: Uuid,
    },

    /// A row belongs to a different road than the one being reconstructed.
    #[error("segment {segment_hash} belongs to road {found}, expected {expected}")]
    ForeignRow {
        /// Road being reconstructed.
        expected: Uuid,
        /// Road recorded on the row.
        found: Uuid,
        /// Offending segment.
        segment_hash: SegmentHash,
    },

    /// No row has an empty previous link.
    #[error("road {road_id} has no head segment")]
    MissingHead {
        /// Road whose chain is malformed.
        road_id: Uuid,
    },

    /// More than one row has an empty previous link.
    #[error("road {road_id} has {count} head segments")]
    MultipleHeads {
        /// Road whose chain is malformed.
        road_id: Uuid,
        /// Number of heads found.
        count: usize,
    },

    /// The same segment hash occurs twice.
    #[error("segment {segment_hash} occurs more than once")]
    DuplicateSegment {
        /// Repeated segment.
        segment_hash: SegmentHash,
    },

    /// A next link points at a segment that has no row.
    #[error("segment {from} links to missing segment {to}")]
    BrokenLink {
        /// Segment holding the dangling link.
        from: SegmentHash,
        /// Missing target.
        to: SegmentHash,
    },

    /// A segment's previous link disagrees with the walk order.
    #[error("segment {segment_hash} does not link back to {expected_previous}")]
    InconsistentLink {
        /// Segment whose previous link is wrong.
        segment_hash: SegmentHash,
        /// Segment the walk arrived from.
        expected_previous: SegmentHash,
    },

    /// Some rows are not reachable from the head.
    #[error("road {road_id} has {count} segments unreachable from the head")]
    Unreachable {
        /// Road whose chain is malformed.
        road_id: Uuid,
        /// Number of orphaned rows.
        count: usize,
    },

    /// The splice target is not part of the chain.
    #[error("segment {segment_hash} is not part of the chain")]
    SegmentNotInChain {
        /// Requested insertion point.
        segment_hash: SegmentHash,
    },

    /// Both halves of a split carry the same hash.
    #[error("split halves must differ, both are {segment_hash}")]
    DegenerateSplit {
        /// The repeated hash.
        segment_hash: SegmentHash,
    },
}
