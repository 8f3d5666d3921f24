//! End-to-end ride flows through the HTTP surface over in-memory adapters.

mod ride_support;

use actix_web::http::StatusCode;
use ridematch::domain::Role;
use serde_json::Value;

use ride_support::{
    RideWorld, decide, frames, init_app, register_driver, register_user, request_road, resize,
    road,
};

fn carried_passengers(view: &Value) -> Vec<String> {
    view["segments"]
        .as_array()
        .expect("segments")
        .iter()
        .filter_map(|segment| segment["alightingUserId"].as_str().map(str::to_owned))
        .collect()
}

fn available_slots(capacity: &Value) -> u64 {
    capacity["availableSlots"].as_u64().expect("available slots")
}

#[actix_web::test]
async fn passenger_request_stages_proposal_and_reserves_seats() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let passenger = register_user(&app, "pat").await;
    let mut driver_outbox = world.connect(Role::Driver, &driver);

    let (status, staged) = request_road(&app, &passenger, 2, 48.87).await;

    assert_eq!(status, StatusCode::CREATED, "{staged}");
    assert_eq!(staged["state"], "staged");
    assert_eq!(staged["roadId"], road_id.as_str());
    let (_, capacity) = resize(&app, &driver, 4).await;
    assert_eq!(available_slots(&capacity), 2);

    let received = frames(&mut driver_outbox);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["type"], "new_proposition");
    assert_eq!(received[0]["requestId"], staged["requestId"]);
    assert_eq!(received[0]["passengers"][0]["name"], "pat");

    let active = road(&app, &road_id, "active").await;
    assert_eq!(active["segments"].as_array().map(Vec::len), Some(1));
    let temporary = road(&app, &road_id, "temporary").await;
    assert_eq!(temporary["requestId"], staged["requestId"]);
    assert_eq!(carried_passengers(&temporary), vec![passenger]);
}

#[actix_web::test]
async fn accepting_promotes_temporary_chain_and_notifies_passengers() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let passenger = register_user(&app, "pat").await;
    let mut passenger_outbox = world.connect(Role::Passenger, &passenger);
    let (_, staged) = request_road(&app, &passenger, 2, 48.87).await;
    let request_id = staged["requestId"].as_str().expect("request id");
    let temporary = road(&app, &road_id, "temporary").await;

    let (status, decision) = decide(&app, &driver, request_id, "accept").await;

    assert_eq!(status, StatusCode::OK, "{decision}");
    assert_eq!(decision["decision"], "accept");
    assert_eq!(decision["notified"], 1);
    let active = road(&app, &road_id, "active").await;
    assert_eq!(active["segments"], temporary["segments"]);
    let emptied = road(&app, &road_id, "temporary").await;
    assert_eq!(emptied["segments"].as_array().map(Vec::len), Some(0));

    let received = frames(&mut passenger_outbox);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["type"], "road_accepted");
    assert_eq!(received[0]["driver"]["email"], "dora@example.com");

    let (_, capacity) = resize(&app, &driver, 4).await;
    assert_eq!(available_slots(&capacity), 2);
}

#[actix_web::test]
async fn rejecting_releases_seats_and_keeps_active_chain() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let passenger = register_user(&app, "pat").await;
    let mut passenger_outbox = world.connect(Role::Passenger, &passenger);
    let before = road(&app, &road_id, "active").await;
    let (_, staged) = request_road(&app, &passenger, 3, 48.87).await;
    let request_id = staged["requestId"].as_str().expect("request id");

    let (status, decision) = decide(&app, &driver, request_id, "reject").await;

    assert_eq!(status, StatusCode::OK, "{decision}");
    assert_eq!(decision["decision"], "reject");
    let (_, capacity) = resize(&app, &driver, 4).await;
    assert_eq!(available_slots(&capacity), 4);
    assert_eq!(road(&app, &road_id, "active").await["segments"], before["segments"]);

    let received = frames(&mut passenger_outbox);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["type"], "road_rejected");

    let (status, again) = decide(&app, &driver, request_id, "reject").await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{again}");
}

#[actix_web::test]
async fn second_passenger_restages_against_temporary_chain() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let first = register_user(&app, "pat").await;
    let second = register_user(&app, "sam").await;
    let mut driver_outbox = world.connect(Role::Driver, &driver);
    let (_, staged) = request_road(&app, &first, 1, 48.87).await;

    let (status, restaged) = request_road(&app, &second, 1, 48.88).await;

    assert_eq!(status, StatusCode::CREATED, "{restaged}");
    assert_eq!(restaged["state"], "staged_updated");
    assert_ne!(restaged["requestId"], staged["requestId"]);
    let temporary = road(&app, &road_id, "temporary").await;
    let mut carried = carried_passengers(&temporary);
    carried.sort();
    let mut expected = vec![first.clone(), second.clone()];
    expected.sort();
    assert_eq!(carried, expected);
    assert_eq!(road(&app, &road_id, "active").await["segments"].as_array().map(Vec::len), Some(1));

    let received = frames(&mut driver_outbox);
    assert_eq!(received.len(), 2);
    assert_eq!(received[1]["requestId"], restaged["requestId"]);
    assert_eq!(received[1]["passengers"].as_array().map(Vec::len), Some(2));

    let stale = staged["requestId"].as_str().expect("request id");
    let (status, _) = decide(&app, &driver, stale, "accept").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pending_passenger_cannot_request_twice() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    register_driver(&app, &driver, 4).await;
    let passenger = register_user(&app, "pat").await;
    request_road(&app, &passenger, 1, 48.87).await;

    let (status, body) = request_road(&app, &passenger, 1, 48.87).await;

    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn oversized_party_finds_no_road() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    register_driver(&app, &driver, 2).await;
    let passenger = register_user(&app, "pat").await;

    let (status, body) = request_road(&app, &passenger, 3, 48.87).await;

    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[actix_web::test]
async fn other_driver_cannot_decide() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let owner = register_user(&app, "dora").await;
    register_driver(&app, &owner, 4).await;
    let intruder = register_user(&app, "ivy").await;
    let passenger = register_user(&app, "pat").await;
    let (_, staged) = request_road(&app, &passenger, 1, 48.87).await;
    // Registered after staging so the proposal stays on Dora's road.
    register_driver(&app, &intruder, 4).await;
    let request_id = staged["requestId"].as_str().expect("request id");

    let (status, body) = decide(&app, &intruder, request_id, "accept").await;

    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[actix_web::test]
async fn pending_passenger_cannot_grow_party_before_rejection() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    register_driver(&app, &driver, 4).await;
    let passenger = register_user(&app, "pat").await;
    let (_, staged) = request_road(&app, &passenger, 1, 48.87).await;
    let request_id = staged["requestId"].as_str().expect("request id");

    let (status, body) = request_road(&app, &passenger, 3, 48.87).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, decision) = decide(&app, &driver, request_id, "reject").await;
    assert_eq!(status, StatusCode::OK, "{decision}");
    let (_, capacity) = resize(&app, &driver, 4).await;
    assert_eq!(available_slots(&capacity), 4);
}

#[actix_web::test]
async fn passengers_sharing_a_stop_are_both_inserted() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let first = register_user(&app, "pat").await;
    let second = register_user(&app, "sam").await;

    let (status, staged) = request_road(&app, &first, 1, 48.87).await;
    assert_eq!(status, StatusCode::CREATED, "{staged}");
    let (status, restaged) = request_road(&app, &second, 1, 48.87).await;

    assert_eq!(status, StatusCode::CREATED, "{restaged}");
    assert_eq!(restaged["state"], "staged_updated");
    let temporary = road(&app, &road_id, "temporary").await;
    let mut carried = carried_passengers(&temporary);
    carried.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(carried, expected);
}

#[actix_web::test]
async fn concurrent_requests_on_one_road_stage_then_restage() {
    let world = RideWorld::new();
    let app = init_app(&world).await;
    let driver = register_user(&app, "dora").await;
    let road_id = register_driver(&app, &driver, 4).await;
    let first = register_user(&app, "pat").await;
    let second = register_user(&app, "sam").await;

    let ((first_status, first_body), (second_status, second_body)) = futures::join!(
        request_road(&app, &first, 1, 48.87),
        request_road(&app, &second, 1, 48.88),
    );

    assert_eq!(first_status, StatusCode::CREATED, "{first_body}");
    assert_eq!(second_status, StatusCode::CREATED, "{second_body}");
    let mut states = vec![
        first_body["state"].as_str().expect("state").to_owned(),
        second_body["state"].as_str().expect("state").to_owned(),
    ];
    states.sort();
    assert_eq!(states, ["staged", "staged_updated"]);
    let temporary = road(&app, &road_id, "temporary").await;
    assert_eq!(carried_passengers(&temporary).len(), 2);
    let (_, capacity) = resize(&app, &driver, 4).await;
    assert_eq!(available_slots(&capacity), 2);
}
