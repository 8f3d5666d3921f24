//! Segments priced by the routing oracle.

use std::collections::BTreeMap;

use route_chain::{ChainError, SegmentHash, SplitPair};
use serde::{Deserialize, Serialize};

/// Travel cost of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCost {
    /// Travel time in milliseconds.
    pub duration_ms: u64,
    /// Length in metres.
    pub length_m: f64,
}

impl SegmentCost {
    /// Sum two costs, saturating on duration overflow.
    pub fn plus(self, other: SegmentCost) -> SegmentCost {
        SegmentCost {
            duration_ms: self.duration_ms.saturating_add(other.duration_ms),
            length_m: self.length_m + other.length_m,
        }
    }

    /// Signed duration difference `self - baseline` in milliseconds.
    pub fn duration_delta_ms(self, baseline: SegmentCost) -> i64 {
        let this = i64::try_from(self.duration_ms).unwrap_or(i64::MAX);
        let base = i64::try_from(baseline.duration_ms).unwrap_or(i64::MAX);
        this.saturating_sub(base)
    }

    /// Length difference `self - baseline` in metres.
    pub fn length_delta_m(self, baseline: SegmentCost) -> f64 {
        self.length_m - baseline.length_m
    }
}

/// An immutable segment and its cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub hash: SegmentHash,
    pub cost: SegmentCost,
}

/// Why a split result could not be turned into a replacement pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// The oracle omitted sequence 1 or 2.
    #[error("split of {segment_hash} is missing sequence {sequence}")]
    MissingSequence {
        segment_hash: SegmentHash,
        sequence: u32,
    },
    /// The two halves share a hash.
    #[error(transparent)]
    Degenerate(#[from] ChainError),
}

/// The two segments replacing a split segment, in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementSegments {
    first: Segment,
    second: Segment,
    pair: SplitPair,
}

impl ReplacementSegments {
    /// Build the pair from the oracle's sequence-numbered split.
    ///
    /// Sequence 1 ends at the passenger's stop and sequence 2 continues to
    /// the end of the original segment. Other sequence numbers are ignored.
    pub fn from_sequences(
        original: &SegmentHash,
        mut sequences: BTreeMap<u32, Segment>,
    ) -> Result<Self, SplitError> {
        let first = sequences
            .remove(&1)
            .ok_or_else(|| SplitError::MissingSequence {
                segment_hash: original.clone(),
                sequence: 1,
            })?;
        let second = sequences
            .remove(&2)
            .ok_or_else(|| SplitError::MissingSequence {
                segment_hash: original.clone(),
                sequence: 2,
            })?;
        let pair = SplitPair::new(first.hash.clone(), second.hash.clone())?;
        Ok(Self {
            first,
            second,
            pair,
        })
    }

    pub fn first(&self) -> &Segment {
        &self.first
    }

    pub fn second(&self) -> &Segment {
        &self.second
    }

    /// Hash pair used to splice the chain.
    pub fn pair(&self) -> &SplitPair {
        &self.pair
    }

    /// Combined cost of both halves.
    pub fn total_cost(&self) -> SegmentCost {
        self.first.cost.plus(self.second.cost)
    }
}
