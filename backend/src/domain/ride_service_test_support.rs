//! Mock wiring and fixtures shared by the ride service tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use mockable::DefaultClock;
use route_chain::{Chain, RoadToSegment, SegmentHash};

use crate::domain::ports::{
    MockCapacityRepository, MockNotifier, MockRiderRepository, MockRoadMatcher,
    MockRouteGraphRepository, MockSegmentOracle,
};
use crate::domain::ride_service_support::RidePorts;
use crate::domain::{
    DepartureWindow, Location, PartySize, Passenger, ProposalState, RequestId, Road, RoadId,
    RoadLocks, Segment, SegmentCost, StagedProposal, UserId, UserProfile,
};

/// One mock per driven port; tests set expectations then call `ports()`.
pub(crate) struct Mocks {
    pub riders: MockRiderRepository,
    pub graph: MockRouteGraphRepository,
    pub capacity: MockCapacityRepository,
    pub matcher: MockRoadMatcher,
    pub oracle: MockSegmentOracle,
    pub notifier: MockNotifier,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            riders: MockRiderRepository::new(),
            graph: MockRouteGraphRepository::new(),
            capacity: MockCapacityRepository::new(),
            matcher: MockRoadMatcher::new(),
            oracle: MockSegmentOracle::new(),
            notifier: MockNotifier::new(),
        }
    }

    pub fn ports(self) -> RidePorts {
        RidePorts {
            riders: Arc::new(self.riders),
            graph: Arc::new(self.graph),
            capacity: Arc::new(self.capacity),
            matcher: Arc::new(self.matcher),
            oracle: Arc::new(self.oracle),
            notifier: Arc::new(self.notifier),
            clock: Arc::new(DefaultClock),
            locks: Arc::new(RoadLocks::new()),
            oracle_timeout: Duration::from_secs(1),
        }
    }

    /// Every segment costs 1000 ms / 100 m; every split yields two halves of
    /// 600 ms / 60 m named `<hash>-1` and `<hash>-2`.
    pub fn with_flat_oracle(mut self) -> Self {
        self.oracle.expect_segment_cost().returning(|_| {
            Ok(SegmentCost {
                duration_ms: 1_000,
                length_m: 100.0,
            })
        });
        self.oracle
            .expect_split_segment()
            .returning(|segment, _| Ok(halves(segment)));
        self
    }
}

pub(crate) fn hash(value: &str) -> SegmentHash {
    SegmentHash::new(value).expect("valid hash")
}

pub(crate) fn halves(segment: &SegmentHash) -> BTreeMap<u32, Segment> {
    let cost = SegmentCost {
        duration_ms: 600,
        length_m: 60.0,
    };
    BTreeMap::from([
        (
            1,
            Segment {
                hash: hash(&format!("{segment}-1")),
                cost,
            },
        ),
        (
            2,
            Segment {
                hash: hash(&format!("{segment}-2")),
                cost,
            },
        ),
    ])
}

pub(crate) fn single_row(road_id: RoadId, segment: &str) -> Vec<RoadToSegment> {
    Chain::single(*road_id.as_uuid(), hash(segment)).to_edges()
}

pub(crate) fn profile(user_id: UserId, name: &str) -> UserProfile {
    UserProfile::new(user_id, name, format!("{}@example.com", name.to_lowercase()))
        .expect("valid profile")
}

pub(crate) fn passenger(user_id: UserId, party_size: u32) -> Passenger {
    let earliest = Utc
        .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let latest = Utc
        .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Passenger {
        user_id,
        location: Location::new(51.5, -0.12).expect("valid location"),
        party_size: PartySize::new(party_size).expect("valid party"),
        departure: DepartureWindow::new(earliest, latest).expect("valid window"),
    }
}

pub(crate) fn road(driver_id: UserId) -> Road {
    Road::new(RoadId::random(), driver_id)
}

pub(crate) fn staged(road: Road, passengers: Vec<UserId>) -> StagedProposal {
    StagedProposal {
        request_id: RequestId::random(),
        road_id: road.id,
        driver_id: road.driver_id,
        passengers,
        duration_delta_ms: 200,
        length_delta_m: 20.0,
        state: ProposalState::Staged,
        staged_at: Utc::now(),
    }
}
