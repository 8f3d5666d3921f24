//! Persisted edge rows linking segments into a road.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SegmentHash;

/// Which copy of a road's chain a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChainVariant {
    /// The committed route the driver is currently following.
    #[default]
    Active,
    /// A staged proposal awaiting the driver's decision.
    Temporary,
}

impl ChainVariant {
    /// Lowercase wire name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Temporary => "temporary",
        }
    }
}

impl fmt::Display for ChainVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "temporary" => Ok(Self::Temporary),
            other => Err(format!("unknown chain variant: {other}")),
        }
    }
}

/// One unordered row of a road's chain.
///
/// `previous_segment_hash` is `None` only for the head and
/// `next_segment_hash` is `None` only for the tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadToSegment {
    /// Road owning the row.
    pub road_id: Uuid,
    /// Segment placed at this position.
    pub segment_hash: SegmentHash,
    /// Segment travelled immediately before this one.
    pub previous_segment_hash: Option<SegmentHash>,
    /// Segment travelled immediately after this one.
    pub next_segment_hash: Option<SegmentHash>,
    /// User whose stop lies at the end of this segment.
    pub alighting_user_id: Option<Uuid>,
}

impl RoadToSegment {
    /// Build a row without an alighting user.
    #[must_use]
    pub const fn new(
        road_id: Uuid,
        segment_hash: SegmentHash,
        previous_segment_hash: Option<SegmentHash>,
        next_segment_hash: Option<SegmentHash>,
    ) -> Self {
        Self {
            road_id,
            segment_hash,
            previous_segment_hash,
            next_segment_hash,
            alighting_user_id: None,
        }
    }

    /// Attach the user alighting at the end of this segment.
    #[must_use]
    pub fn with_alighting_user(mut self, user_id: Uuid) -> Self {
        self.alighting_user_id = Some(user_id);
        self
    }

    /// Whether this row starts the chain.
    #[must_use]
    pub const fn is_head(&self) -> bool {
        self.previous_segment_hash.is_none()
    }

    /// Whether this row ends the chain.
    #[must_use]
    pub const fn is_tail(&self) -> bool {
        self.next_segment_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("active", ChainVariant::Active)]
    #[case("temporary", ChainVariant::Temporary)]
    fn parses_variant_names(#[case] raw: &str, #[case] expected: ChainVariant) {
        assert_eq!(raw.parse::<ChainVariant>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[test]
    fn rejects_unknown_variant() {
        assert!("final".parse::<ChainVariant>().is_err());
    }

    #[test]
    fn serialises_rows_in_camel_case() {
        let row = RoadToSegment::new(
            Uuid::nil(),
            SegmentHash::new("a").expect("valid hash"),
            None,
            None,
        )
        .with_alighting_user(Uuid::nil());
        let json = serde_json::to_value(&row).expect("serialise row");
        assert_eq!(json["segmentHash"], "a");
        assert!(json["previousSegmentHash"].is_null());
        assert_eq!(json["alightingUserId"], Uuid::nil().to_string());
    }
}
