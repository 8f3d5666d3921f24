//! Straight-line segment oracle.
//!
//! Segments are great-circle legs between two coordinates. Length is the
//! haversine distance and duration assumes a constant average speed.
//!
//! A segment hash carries its endpoints, rounded to six decimals, followed by
//! a hex SHA-256 tag: `lat,lon;lat,lon#tag`. Costs are recomputed from the
//! hash alone, so the oracle keeps no per-segment state. The tag of a split
//! half covers the parent hash, the passenger and the sequence number, so
//! halves never collide with each other or with segments already on the road,
//! even when the passenger's stop coincides with an existing stop.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use route_chain::SegmentHash;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::ports::{RiderRepository, SegmentOracle, SegmentOracleError};
use crate::domain::{Location, Segment, SegmentCost, UserId};

/// Average speed used when none is configured.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

const ROAD_ORIGIN_TAG: &str = "origin";

#[derive(Debug, Clone, Copy)]
struct Leg {
    from: Location,
    to: Location,
}

impl Leg {
    fn endpoints(self) -> String {
        format!(
            "{:.6},{:.6};{:.6},{:.6}",
            self.from.latitude(),
            self.from.longitude(),
            self.to.latitude(),
            self.to.longitude()
        )
    }

    fn encode(self, tag_input: &str) -> Result<SegmentHash, SegmentOracleError> {
        let endpoints = self.endpoints();
        let tag = hex::encode(Sha256::digest(format!("{endpoints}|{tag_input}").as_bytes()));
        SegmentHash::new(format!("{endpoints}#{tag}"))
            .map_err(|err| SegmentOracleError::unavailable(err.to_string()))
    }

    fn decode(segment_hash: &SegmentHash) -> Result<Self, SegmentOracleError> {
        let unknown = || SegmentOracleError::unknown_segment(segment_hash.as_str());
        let (endpoints, _tag) = segment_hash.as_str().split_once('#').ok_or_else(unknown)?;
        let (from, to) = endpoints.split_once(';').ok_or_else(unknown)?;
        Ok(Self {
            from: parse_point(from).ok_or_else(unknown)?,
            to: parse_point(to).ok_or_else(unknown)?,
        })
    }
}

fn parse_point(raw: &str) -> Option<Location> {
    let (latitude, longitude) = raw.split_once(',')?;
    Location::new(latitude.parse().ok()?, longitude.parse().ok()?).ok()
}

/// [`SegmentOracle`] pricing legs geometrically and resolving passenger
/// stops through the rider repository.
pub struct GeometricSegmentOracle {
    riders: Arc<dyn RiderRepository>,
    metres_per_ms: f64,
}

impl GeometricSegmentOracle {
    /// Create an oracle; non-positive or non-finite speeds fall back to
    /// [`DEFAULT_AVERAGE_SPEED_KMH`].
    pub fn new(riders: Arc<dyn RiderRepository>, average_speed_kmh: f64) -> Self {
        let kmh = if average_speed_kmh.is_finite() && average_speed_kmh > 0.0 {
            average_speed_kmh
        } else {
            DEFAULT_AVERAGE_SPEED_KMH
        };
        Self {
            riders,
            metres_per_ms: kmh / 3_600.0,
        }
    }

    fn cost(&self, leg: Leg) -> SegmentCost {
        let length_m = leg.from.distance_m(&leg.to);
        let duration = (length_m / self.metres_per_ms).round();
        SegmentCost {
            // Saturates on overflow; non-finite inputs are rejected by `Location`.
            duration_ms: duration as u64,
            length_m,
        }
    }

    /// Price the leg as stored in its hash, after rounding.
    fn segment(&self, leg: Leg, tag_input: &str) -> Result<Segment, SegmentOracleError> {
        let hash = leg.encode(tag_input)?;
        let cost = self.cost(Leg::decode(&hash)?);
        Ok(Segment { hash, cost })
    }
}

#[async_trait]
impl SegmentOracle for GeometricSegmentOracle {
    async fn segment_cost(
        &self,
        segment_hash: &SegmentHash,
    ) -> Result<SegmentCost, SegmentOracleError> {
        Leg::decode(segment_hash).map(|leg| self.cost(leg))
    }

    async fn split_segment(
        &self,
        segment_hash: &SegmentHash,
        passenger_id: UserId,
    ) -> Result<BTreeMap<u32, Segment>, SegmentOracleError> {
        let leg = Leg::decode(segment_hash)?;
        let stop = self
            .riders
            .find_passenger(passenger_id)
            .await
            .map_err(|err| SegmentOracleError::unavailable(err.to_string()))?
            .ok_or_else(|| SegmentOracleError::unknown_passenger(passenger_id))?
            .location;
        let tag = |sequence: u32| format!("{segment_hash}|{passenger_id}|{sequence}");
        let first = self.segment(
            Leg {
                from: leg.from,
                to: stop,
            },
            &tag(1),
        )?;
        let second = self.segment(
            Leg {
                from: stop,
                to: leg.to,
            },
            &tag(2),
        )?;
        debug!(
            segment_hash = %segment_hash,
            first = %first.hash,
            second = %second.hash,
            "split segment at passenger stop"
        );
        Ok(BTreeMap::from([(1, first), (2, second)]))
    }

    async fn initial_segment(
        &self,
        from: Location,
        to: Location,
    ) -> Result<Segment, SegmentOracleError> {
        self.segment(Leg { from, to }, ROAD_ORIGIN_TAG)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::ports::MockRiderRepository;
    use crate::domain::{DepartureWindow, PartySize, Passenger};

    fn location(latitude: f64, longitude: f64) -> Location {
        Location::new(latitude, longitude).expect("valid location")
    }

    fn oracle_with_stop(stop: Location) -> GeometricSegmentOracle {
        let mut riders = MockRiderRepository::new();
        riders.expect_find_passenger().returning(move |id| {
            let earliest = Utc
                .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
                .single()
                .expect("valid timestamp");
            let latest = Utc
                .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp");
            Ok(Some(Passenger {
                user_id: id,
                location: stop,
                party_size: PartySize::new(1).expect("party"),
                departure: DepartureWindow::new(earliest, latest).expect("window"),
            }))
        });
        GeometricSegmentOracle::new(Arc::new(riders), 36.0)
    }

    #[tokio::test]
    async fn initial_segment_is_priced_from_its_hash() {
        let oracle = oracle_with_stop(location(0.0, 0.0));
        let segment = oracle
            .initial_segment(location(0.0, 0.0), location(0.0, 0.01))
            .await
            .expect("segment");

        // 36 km/h is 10 m/s.
        let expected_ms = (segment.cost.length_m * 100.0).round() as u64;
        assert_eq!(segment.cost.duration_ms, expected_ms);
        assert_eq!(
            oracle.segment_cost(&segment.hash).await.expect("known"),
            segment.cost
        );
    }

    #[tokio::test]
    async fn another_instance_prices_the_same_hash() {
        let segment = oracle_with_stop(location(0.0, 0.0))
            .initial_segment(location(48.85, 2.3), location(48.9, 2.4))
            .await
            .expect("segment");

        let fresh = oracle_with_stop(location(0.0, 0.0));

        assert_eq!(
            fresh.segment_cost(&segment.hash).await.expect("decodable"),
            segment.cost
        );
    }

    #[tokio::test]
    async fn same_leg_hashes_identically() {
        let oracle = oracle_with_stop(location(0.0, 0.0));
        let first = oracle
            .initial_segment(location(1.0, 1.0), location(1.1, 1.1))
            .await
            .expect("segment");
        let second = oracle
            .initial_segment(location(1.0, 1.0), location(1.1, 1.1))
            .await
            .expect("segment");

        assert_eq!(first.hash, second.hash);
    }

    #[tokio::test]
    async fn split_passes_through_passenger_stop() {
        let stop = location(0.0, 0.005);
        let oracle = oracle_with_stop(stop);
        let original = oracle
            .initial_segment(location(0.0, 0.0), location(0.0, 0.01))
            .await
            .expect("segment");

        let halves = oracle
            .split_segment(&original.hash, UserId::random())
            .await
            .expect("split");

        let first = halves.get(&1).expect("sequence 1");
        let second = halves.get(&2).expect("sequence 2");
        let total = first.cost.length_m + second.cost.length_m;
        assert!((total - original.cost.length_m).abs() < 1.0);
        assert_ne!(first.hash, second.hash);
    }

    #[tokio::test]
    async fn stop_on_an_existing_endpoint_yields_fresh_hashes() {
        let start = location(0.0, 0.0);
        let oracle = oracle_with_stop(start);
        let original = oracle
            .initial_segment(start, location(0.0, 0.01))
            .await
            .expect("segment");

        let halves = oracle
            .split_segment(&original.hash, UserId::random())
            .await
            .expect("split");
        let first = halves.get(&1).expect("sequence 1");
        let second = halves.get(&2).expect("sequence 2");

        assert_eq!(first.cost.duration_ms, 0);
        assert_ne!(second.hash, original.hash);
        assert_ne!(first.hash, original.hash);
        assert_eq!(second.cost, original.cost);
    }

    #[tokio::test]
    async fn passengers_sharing_a_stop_get_distinct_halves() {
        let oracle = oracle_with_stop(location(0.0, 0.005));
        let original = oracle
            .initial_segment(location(0.0, 0.0), location(0.0, 0.01))
            .await
            .expect("segment");

        let first_rider = oracle
            .split_segment(&original.hash, UserId::random())
            .await
            .expect("split");
        let second_rider = oracle
            .split_segment(&original.hash, UserId::random())
            .await
            .expect("split");

        assert_ne!(first_rider.get(&1), second_rider.get(&1));
        assert_ne!(first_rider.get(&2), second_rider.get(&2));
    }

    #[tokio::test]
    async fn undecodable_segment_is_reported() {
        let oracle = oracle_with_stop(location(0.0, 0.0));
        let err = oracle
            .segment_cost(&SegmentHash::new("missing").expect("hash"))
            .await
            .expect_err("unknown");

        assert!(matches!(err, SegmentOracleError::UnknownSegment { .. }));
    }

    #[tokio::test]
    async fn unknown_passenger_is_reported() {
        let mut riders = MockRiderRepository::new();
        riders.expect_find_passenger().returning(|_| Ok(None));
        let oracle = GeometricSegmentOracle::new(Arc::new(riders), 40.0);
        let original = oracle
            .initial_segment(location(0.0, 0.0), location(0.0, 0.01))
            .await
            .expect("segment");

        let err = oracle
            .split_segment(&original.hash, UserId::random())
            .await
            .expect_err("no stop");

        assert!(matches!(err, SegmentOracleError::UnknownPassenger { .. }));
    }
}
