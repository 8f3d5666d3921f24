//! Insertion planner: cheapest point to splice a passenger into a chain.
//!
//! The planner is read-only. It reconstructs the chain, prices every segment
//! as an insertion point through the [`SegmentOracle`], and keeps the
//! candidate with the smallest duration increase. Ties go to the segment met
//! first on a head-to-tail walk.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use route_chain::{Chain, ChainError, InsertionCandidate, RoadToSegment, SegmentHash, select_cheapest};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{SegmentOracle, SegmentOracleError};
use crate::domain::{Error, ReplacementSegments, RoadId, SplitError, UserId};

/// Why a plan could not be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    /// Rows do not form a single chain from one head.
    #[error("route is malformed: {0}")]
    RouteMalformed(#[from] ChainError),
    /// The walk visited no segment.
    #[error("no insertion point found on road {road_id}")]
    InsertionPointNotFound { road_id: RoadId },
    /// The oracle reported a failure.
    #[error(transparent)]
    Oracle(#[from] SegmentOracleError),
    /// The oracle did not answer in time.
    #[error("segment oracle did not answer within {timeout_ms} ms")]
    OracleTimeout { timeout_ms: u128 },
    /// The oracle's split lacked sequence 1 or 2.
    #[error(transparent)]
    IncompleteSplit(#[from] SplitError),
}

/// Map planning failures onto the domain error taxonomy.
pub(crate) fn map_planning_error(error: PlanningError) -> Error {
    match error {
        PlanningError::RouteMalformed(cause) => {
            Error::internal(format!("road chain is malformed: {cause}"))
        }
        PlanningError::InsertionPointNotFound { road_id } => {
            Error::not_found(format!("no insertion point found on road {road_id}"))
        }
        PlanningError::OracleTimeout { timeout_ms } => {
            Error::service_unavailable("segment oracle timed out")
                .with_details(json!({ "timeoutMs": timeout_ms }))
        }
        PlanningError::Oracle(cause) => {
            Error::service_unavailable(format!("segment oracle failed: {cause}"))
        }
        PlanningError::IncompleteSplit(cause) => {
            Error::service_unavailable(format!("segment oracle returned an unusable split: {cause}"))
        }
    }
}

/// Await an oracle call, failing as an upstream timeout after `limit`.
pub(crate) async fn bounded_oracle_call<T, F>(limit: Duration, call: F) -> Result<T, PlanningError>
where
    F: Future<Output = Result<T, SegmentOracleError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(PlanningError::from),
        Err(_) => Err(PlanningError::OracleTimeout {
            timeout_ms: limit.as_millis(),
        }),
    }
}

/// Outcome of planning one passenger against one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionPlan {
    road_id: RoadId,
    passenger_id: UserId,
    chain: Chain,
    best_segment_hash: SegmentHash,
    cost_difference_ms: i64,
    length_difference_m: f64,
    replacement: ReplacementSegments,
}

impl InsertionPlan {
    pub fn road_id(&self) -> RoadId {
        self.road_id
    }

    pub fn passenger_id(&self) -> UserId {
        self.passenger_id
    }

    /// The chain the plan was computed against.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn best_segment_hash(&self) -> &SegmentHash {
        &self.best_segment_hash
    }

    /// Replacement duration minus original duration, in milliseconds.
    pub fn cost_difference_ms(&self) -> i64 {
        self.cost_difference_ms
    }

    pub fn length_difference_m(&self) -> f64 {
        self.length_difference_m
    }

    pub fn replacement(&self) -> &ReplacementSegments {
        &self.replacement
    }
}

/// Prices insertion points through the segment oracle.
#[derive(Clone)]
pub struct InsertionPlanner {
    oracle: Arc<dyn SegmentOracle>,
    oracle_timeout: Duration,
}

impl InsertionPlanner {
    /// Create a planner whose oracle calls are bounded by `oracle_timeout`.
    pub fn new(oracle: Arc<dyn SegmentOracle>, oracle_timeout: Duration) -> Self {
        Self {
            oracle,
            oracle_timeout,
        }
    }

    /// Plan the cheapest insertion of `passenger_id` into the given rows.
    ///
    /// Oracle calls run one segment at a time from the head; the first
    /// failure aborts the plan. Candidates whose halves already occur on the
    /// road are skipped.
    pub async fn plan(
        &self,
        road_id: RoadId,
        passenger_id: UserId,
        rows: Vec<RoadToSegment>,
    ) -> Result<InsertionPlan, PlanningError> {
        let chain = Chain::from_edges(*road_id.as_uuid(), rows)?;

        let mut candidates = Vec::with_capacity(chain.len());
        for link in &chain {
            let hash = &link.segment_hash;
            let original =
                bounded_oracle_call(self.oracle_timeout, self.oracle.segment_cost(hash)).await?;
            let sequences = bounded_oracle_call(
                self.oracle_timeout,
                self.oracle.split_segment(hash, passenger_id),
            )
            .await?;
            let replacement = ReplacementSegments::from_sequences(hash, sequences)?;
            if chain.contains(&replacement.first().hash) || chain.contains(&replacement.second().hash)
            {
                warn!(
                    road_id = %road_id,
                    segment_hash = %hash,
                    "split reuses a segment already on the road; candidate skipped"
                );
                continue;
            }
            let total = replacement.total_cost();
            let cost_difference_ms = total.duration_delta_ms(original);
            debug!(
                road_id = %road_id,
                segment_hash = %hash,
                cost_difference_ms,
                "priced insertion candidate"
            );
            candidates.push(InsertionCandidate {
                segment_hash: hash.clone(),
                cost_difference_ms,
                details: (replacement, total.length_delta_m(original)),
            });
        }

        let best = select_cheapest(candidates)
            .ok_or(PlanningError::InsertionPointNotFound { road_id })?;
        let (replacement, length_difference_m) = best.details;
        Ok(InsertionPlan {
            road_id,
            passenger_id,
            chain,
            best_segment_hash: best.segment_hash,
            cost_difference_ms: best.cost_difference_ms,
            length_difference_m,
            replacement,
        })
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
