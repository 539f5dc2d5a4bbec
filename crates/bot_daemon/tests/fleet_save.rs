mod common;

use std::time::Duration;

use bot_core::test_fixtures::{at, fleet, slots};
use bot_core::{CelestialId, Mission, Resources, ShipType, Ships};
use bot_daemon::{fleet_save, ProviderCall, SaveError, SaveRequest};
use common::{colony, home, pinned, settings, snapshot, two_planets, Harness};

const NO_WAIT: &str = r#"{ "fleet_save": { "wait_for_returns": "none", "recall": false } }"#;

#[tokio::test(start_paused = true)]
async fn saved_fleet_carries_the_stock_minus_fuel() {
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings(NO_WAIT), at(12, 0)).await;

    let fleet = fleet_save(&h.ctx, SaveRequest::new(CelestialId(1), 3600)).await.unwrap();

    assert_eq!(fleet.mission, Mission::Deploy);
    assert_eq!(fleet.destination, colony());
    assert_eq!(fleet.ships, Ships::of(ShipType::SmallCargo, 10));
    assert_eq!(fleet.payload, Resources::new(20_000, 10_000, 4900));
    assert!(h.ships_on(1).is_empty());
    assert!(h.notes().iter().any(|n| n.contains("saved")));
}

#[tokio::test(start_paused = true)]
async fn recall_comes_at_half_the_outbound_leg() {
    let json = r#"{ "fleet_save": { "wait_for_returns": "none", "recall": true } }"#;
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings(json), at(12, 0)).await;

    let fleet = fleet_save(&h.ctx, SaveRequest::new(CelestialId(1), 3600)).await.unwrap();
    let recalled = |h: &Harness| {
        h.sim
            .calls()
            .contains(&ProviderCall::RecallFleet(fleet.id))
    };

    tokio::time::sleep(Duration::from_secs(1790)).await;
    assert!(!recalled(&h));
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert!(recalled(&h));
}

#[tokio::test(start_paused = true)]
async fn no_slot_fails_and_notifies() {
    let mut snap = snapshot(two_planets());
    snap.slots = slots(1, 1);
    let h = Harness::new(snap, pinned(3600, 100), settings(NO_WAIT), at(12, 0)).await;

    let result = fleet_save(&h.ctx, SaveRequest::new(CelestialId(1), 3600)).await;

    assert_eq!(result, Err(SaveError::NoSlot));
    assert!(h.sim.sent_fleets().is_empty());
    assert!(h.notes().iter().any(|n| n.contains("failed")));
}

#[tokio::test(start_paused = true)]
async fn empty_celestial_is_quietly_skipped() {
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings(NO_WAIT), at(12, 0)).await;

    let result = fleet_save(&h.ctx, SaveRequest::new(CelestialId(2), 3600)).await;

    assert_eq!(result, Err(SaveError::NothingToSave));
    assert!(h.notes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_celestial_is_an_error() {
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings(NO_WAIT), at(12, 0)).await;

    let result = fleet_save(&h.ctx, SaveRequest::new(CelestialId(77), 3600)).await;

    assert_eq!(result, Err(SaveError::UnknownCelestial(CelestialId(77))));
}

#[tokio::test(start_paused = true)]
async fn returning_fleet_is_awaited_and_joins_the_save() {
    let mut snap = snapshot(two_planets());
    let mut returning = fleet(9, Mission::Transport, home(), colony(), at(12, 15), Some(at(12, 30)));
    returning.ships = Ships::of(ShipType::SmallCargo, 5);
    snap.fleets = vec![returning];
    snap.slots = slots(4, 1);
    let json = r#"{ "fleet_save": { "wait_for_returns": "celestial", "max_wait_secs": 3600, "recall": false } }"#;
    let h = Harness::new(snap, pinned(3600, 100), settings(json), at(12, 0)).await;

    let fleet = fleet_save(&h.ctx, SaveRequest::new(CelestialId(1), 3600)).await.unwrap();

    assert_eq!(fleet.ships, Ships::of(ShipType::SmallCargo, 15));
    assert!(fleet.start_time >= at(12, 30));
}

#[tokio::test(start_paused = true)]
async fn deadline_cuts_the_wait_short() {
    let mut snap = snapshot(two_planets());
    let mut returning = fleet(9, Mission::Transport, home(), colony(), at(12, 15), Some(at(12, 30)));
    returning.ships = Ships::of(ShipType::SmallCargo, 5);
    snap.fleets = vec![returning];
    snap.slots = slots(4, 1);
    let json = r#"{ "fleet_save": { "wait_for_returns": "account", "max_wait_secs": 3600, "recall": false } }"#;
    let h = Harness::new(snap, pinned(3600, 100), settings(json), at(12, 0)).await;

    let request = SaveRequest {
        deadline: Some(at(12, 10)),
        ..SaveRequest::new(CelestialId(1), 3600)
    };
    let fleet = fleet_save(&h.ctx, request).await.unwrap();

    assert_eq!(fleet.ships, Ships::of(ShipType::SmallCargo, 10));
    assert!(fleet.start_time < at(12, 30));
}
