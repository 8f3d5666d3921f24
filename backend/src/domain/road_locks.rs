//! Per-road mutual exclusion for plan-and-stage and decision resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::RoadId;

/// Held while a road's chains are read and rewritten.
///
/// Dropping the guard releases the road.
#[derive(Debug)]
pub struct RoadGuard {
    road_id: RoadId,
    _guard: OwnedMutexGuard<()>,
}

impl RoadGuard {
    pub fn road_id(&self) -> RoadId {
        self.road_id
    }
}

/// Registry of per-road async locks.
///
/// Operations on different roads never contend. Idle entries are pruned on
/// each acquisition.
#[derive(Debug, Default)]
pub struct RoadLocks {
    roads: Mutex<HashMap<RoadId, Arc<AsyncMutex<()>>>>,
}

impl RoadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `road_id`.
    pub async fn acquire(&self, road_id: RoadId) -> RoadGuard {
        let lock = {
            let mut roads = self.roads.lock().unwrap_or_else(PoisonError::into_inner);
            roads.retain(|id, lock| *id == road_id || Arc::strong_count(lock) > 1);
            Arc::clone(roads.entry(road_id).or_default())
        };
        RoadGuard {
            road_id,
            _guard: lock.lock_owned().await,
        }
    }

    /// Whether some task currently holds `road_id`.
    pub fn is_held(&self, road_id: RoadId) -> bool {
        self.roads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&road_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Number of roads with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.roads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
