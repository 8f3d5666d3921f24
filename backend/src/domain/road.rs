//! Driver roads.

use serde::{Deserialize, Serialize};

use crate::domain::{RoadId, UserId};

/// A driver's road. Each driver owns at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Road {
    pub id: RoadId,
    pub driver_id: UserId,
}

impl Road {
    pub fn new(id: RoadId, driver_id: UserId) -> Self {
        Self { id, driver_id }
    }

    pub fn is_driven_by(&self, user_id: UserId) -> bool {
        self.driver_id == user_id
    }
}
