//! Tests for the in-memory store.

use chrono::{DateTime, TimeZone, Utc};
use route_chain::{Chain, ChainVariant, SegmentHash, SplitPair};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    CapacityRepository, CapacityRepositoryError, RiderRepository, RoadMatcher,
    RouteGraphRepository, RouteGraphRepositoryError,
};
use crate::domain::{
    CapacityError, DepartureWindow, Location, PartySize, ProposalState, SeatCapacity, SlotDelta,
};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn window(from: u32, to: u32) -> DepartureWindow {
    DepartureWindow::new(at(from), at(to)).expect("valid window")
}

fn hash(value: &str) -> SegmentHash {
    SegmentHash::new(value).expect("valid hash")
}

fn driver(latitude: f64, seats: u32, departure: DepartureWindow) -> Driver {
    Driver {
        user_id: UserId::random(),
        location: Location::new(latitude, 0.0).expect("valid location"),
        destination: Location::new(latitude + 0.1, 0.1).expect("valid location"),
        departure,
        capacity: SeatCapacity::new(seats).expect("seats"),
    }
}

fn rider(latitude: f64, party: u32) -> Passenger {
    Passenger {
        user_id: UserId::random(),
        location: Location::new(latitude, 0.0).expect("valid location"),
        party_size: PartySize::new(party).expect("party"),
        departure: window(8, 9),
    }
}

fn proposal(road: Road, passengers: Vec<UserId>) -> StagedProposal {
    StagedProposal {
        request_id: RequestId::random(),
        road_id: road.id,
        driver_id: road.driver_id,
        passengers,
        duration_delta_ms: 0,
        length_delta_m: 0.0,
        state: ProposalState::Staged,
        staged_at: at(8),
    }
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn seed_road(store: &InMemoryStore, driver: &Driver) -> Road {
    store.save_driver(driver).await.expect("save driver");
    let road = Road::new(RoadId::random(), driver.user_id);
    let rows = Chain::single(*road.id.as_uuid(), hash("origin")).to_edges();
    store.create_road(&road, &rows).await.expect("create road");
    road
}

fn staged_rows(road: Road, passenger: UserId) -> Vec<RoadToSegment> {
    Chain::single(*road.id.as_uuid(), hash("origin"))
        .splice(
            &hash("origin"),
            &SplitPair::new(hash("a"), hash("b")).expect("pair"),
            *passenger.as_uuid(),
        )
        .expect("splice")
        .to_edges()
}

#[rstest]
#[tokio::test]
async fn driver_owns_a_single_road(store: InMemoryStore) {
    let owner = driver(51.0, 4, window(8, 9));
    let road = seed_road(&store, &owner).await;

    let again = Road::new(RoadId::random(), owner.user_id);
    let err = store
        .create_road(&again, &[])
        .await
        .expect_err("second road");

    assert!(matches!(err, RouteGraphRepositoryError::RoadExists { .. }));
    assert_eq!(
        store
            .find_road_by_driver(owner.user_id)
            .await
            .expect("lookup"),
        Some(road)
    );
}

#[rstest]
#[tokio::test]
async fn staging_keeps_active_chain_until_promotion(store: InMemoryStore) {
    let owner = driver(51.0, 4, window(8, 9));
    let road = seed_road(&store, &owner).await;
    let passenger = UserId::random();
    let pending = proposal(road, vec![passenger]);

    store
        .write_staged_chain(&pending, &staged_rows(road, passenger))
        .await
        .expect("stage");

    let active = store
        .read_chain(road.id, ChainVariant::Active)
        .await
        .expect("active");
    assert_eq!(active.len(), 1);
    assert_eq!(
        store
            .find_road_carrying(passenger, ChainVariant::Temporary)
            .await
            .expect("carrying"),
        Some(road.id)
    );
    assert_eq!(
        store
            .find_road_carrying(passenger, ChainVariant::Active)
            .await
            .expect("carrying"),
        None
    );

    store.promote_chain(road.id).await.expect("promote");

    let promoted = store
        .read_chain(road.id, ChainVariant::Active)
        .await
        .expect("active");
    assert_eq!(promoted.len(), 2);
    assert!(
        store
            .read_chain(road.id, ChainVariant::Temporary)
            .await
            .expect("temporary")
            .is_empty()
    );
    assert_eq!(
        store
            .find_proposal_by_request(pending.request_id)
            .await
            .expect("lookup"),
        None
    );
}

#[rstest]
#[tokio::test]
async fn restaging_supersedes_previous_request(store: InMemoryStore) {
    let owner = driver(51.0, 4, window(8, 9));
    let road = seed_road(&store, &owner).await;
    let passenger = UserId::random();
    let first = proposal(road, vec![passenger]);
    let second = proposal(road, vec![passenger, UserId::random()]);

    store
        .write_staged_chain(&first, &staged_rows(road, passenger))
        .await
        .expect("stage");
    store
        .write_staged_chain(&second, &staged_rows(road, passenger))
        .await
        .expect("restage");

    assert_eq!(
        store
            .find_proposal_by_request(first.request_id)
            .await
            .expect("lookup"),
        None
    );
    assert_eq!(
        store
            .find_proposal_by_request(second.request_id)
            .await
            .expect("lookup")
            .map(|p| p.passengers.len()),
        Some(2)
    );
}

#[rstest]
#[tokio::test]
async fn discard_without_stage_is_reported(store: InMemoryStore) {
    let road = seed_road(&store, &driver(51.0, 2, window(8, 9))).await;

    let err = store
        .discard_chain(road.id)
        .await
        .expect_err("nothing staged");

    assert!(matches!(err, RouteGraphRepositoryError::NoStagedChain { .. }));
}

#[rstest]
#[tokio::test]
async fn capacity_deltas_are_checked_and_persisted(store: InMemoryStore) {
    let owner = driver(51.0, 3, window(8, 9));
    store.save_driver(&owner).await.expect("save driver");
    let two = PartySize::new(2).expect("party");

    let after = store
        .apply_delta(owner.user_id, SlotDelta::Reserve(two))
        .await
        .expect("reserve");
    assert_eq!(after.available_slots(), 1);

    let err = store
        .apply_delta(owner.user_id, SlotDelta::Reserve(two))
        .await
        .expect_err("exhausted");
    assert_eq!(
        err,
        CapacityRepositoryError::Rejected {
            reason: CapacityError::Exhausted {
                requested: 2,
                available: 1,
            }
        }
    );

    let stored = store
        .find_driver(owner.user_id)
        .await
        .expect("lookup")
        .expect("driver exists");
    assert_eq!(stored.capacity.available_slots(), 1);
}

#[rstest]
#[tokio::test]
async fn unknown_driver_has_no_capacity(store: InMemoryStore) {
    let err = store
        .apply_delta(UserId::random(), SlotDelta::Resize(2))
        .await
        .expect_err("missing driver");

    assert!(matches!(err, CapacityRepositoryError::DriverNotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn matcher_prefers_nearest_eligible_driver(store: InMemoryStore) {
    let near = driver(51.01, 4, window(8, 9));
    let far = driver(51.5, 4, window(8, 9));
    let late = driver(51.0, 4, window(12, 13));
    let full = driver(51.0, 1, window(8, 9));
    let near_road = seed_road(&store, &near).await;
    seed_road(&store, &far).await;
    seed_road(&store, &late).await;
    seed_road(&store, &full).await;

    let matched = store
        .match_road(&rider(51.0, 2))
        .await
        .expect("match");

    assert_eq!(matched, Some(near_road.id));
}

#[rstest]
#[tokio::test]
async fn matcher_returns_none_without_candidates(store: InMemoryStore) {
    seed_road(&store, &driver(51.0, 1, window(8, 9))).await;

    let matched = store
        .match_road(&rider(51.0, 3))
        .await
        .expect("match");

    assert_eq!(matched, None);
}
