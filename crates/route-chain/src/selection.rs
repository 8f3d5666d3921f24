//! Minimum-cost insertion selection.

use crate::SegmentHash;

/// A priced insertion point produced while walking a chain.
///
/// `details` carries whatever the planner needs to act on the winner, such as
/// the replacement segments and the length difference.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionCandidate<T> {
    /// Segment that would be split.
    pub segment_hash: SegmentHash,
    /// Replacement duration minus original duration, in milliseconds.
    pub cost_difference_ms: i64,
    /// Planner-specific payload.
    pub details: T,
}

/// Pick the candidate with the smallest cost difference.
///
/// Candidates must be supplied in head-to-tail order: on a tie the earliest
/// one wins. Returns `None` when there are no candidates.
///
/// # Examples
///
/// ```
/// use route_chain::{InsertionCandidate, SegmentHash, select_cheapest};
///
/// let candidate = |name: &str, cost: i64| InsertionCandidate {
///     segment_hash: SegmentHash::new(name).expect("valid hash"),
///     cost_difference_ms: cost,
///     details: (),
/// };
/// let best = select_cheapest(vec![candidate("a", 50), candidate("b", 10), candidate("c", 10)])
///     .expect("non-empty");
/// assert_eq!(best.segment_hash.as_str(), "b");
/// ```
pub fn select_cheapest<T, I>(candidates: I) -> Option<InsertionCandidate<T>>
where
    I: IntoIterator<Item = InsertionCandidate<T>>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.cost_difference_ms <= candidate.cost_difference_ms => {
            Some(current)
        }
        _ => Some(candidate),
    })
}
