//! Driving port for a driver's accept/reject decision.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, RequestId, RoadId, UserId};

/// Driver verdict on a staged proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            other => Err(
                Error::invalid_request("decision must be accept or reject").with_details(json!({
                    "field": "decision",
                    "value": other,
                    "code": "invalid_decision",
                })),
            ),
        }
    }
}

/// Raw decision input; the decision string is validated by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadDecisionRequest {
    pub driver_id: UserId,
    pub request_id: RequestId,
    pub decision: String,
}

/// Outcome of a resolved decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadDecisionResponse {
    pub request_id: RequestId,
    pub road_id: RoadId,
    pub decision: Decision,
    /// Passengers that were pending on the proposal.
    pub passengers: Vec<UserId>,
    /// Passengers whose notification reached a live connection.
    pub delivered: usize,
}

/// Driving port for the decision resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadDecisionCommand: Send + Sync {
    async fn resolve_decision(
        &self,
        request: RoadDecisionRequest,
    ) -> Result<RoadDecisionResponse, Error>;
}
