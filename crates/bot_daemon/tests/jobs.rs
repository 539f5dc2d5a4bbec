mod common;

use std::sync::Arc;
use std::time::Duration;

use bot_control::{ColonizeSettings, ExpeditionSettings, FarmSettings};
use bot_core::test_fixtures::{at, inactive_slot, planet, report};
use bot_core::{
    Buildable, CelestialId, Coordinate, EventId, FarmState, Feature, HostileEvent, Mission,
    Resources, ShipType, Ships,
};
use bot_daemon::{Handlers, JobOutcome, JobRunner, ProviderCall, Scheduler, TimerKey};
use common::{home, pinned, settings, snapshot, two_planets, Harness};

fn scheduler(h: &Harness) -> Scheduler {
    Scheduler::new(h.ctx.clone(), Arc::new(Handlers))
}

async fn run(scheduler: &Scheduler, feature: Feature) -> JobOutcome {
    Handlers
        .run(TimerKey::root(feature), scheduler)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// AutoFarm
// ---------------------------------------------------------------------------

fn farm_target() -> Coordinate {
    Coordinate::planet(1, 110, 5)
}

fn farm_state(h: &Harness) -> Option<FarmState> {
    h.ctx.state.lock().farm.get(&farm_target()).map(|t| t.state)
}

async fn farm_harness() -> Harness {
    let mut celestials = two_planets();
    celestials[0].ships.set(ShipType::EspionageProbe, 4);
    let mut snap = snapshot(celestials);
    snap.galaxy = vec![inactive_slot(farm_target())];
    snap.reports = vec![report(
        farm_target(),
        at(12, 0),
        Resources::new(40_000, 20_000, 10_000),
        true,
    )];
    let mut config = settings(r#"{ "features": { "auto_farm": true } }"#);
    config.farm = Some(FarmSettings {
        galaxy: 1,
        from_system: 110,
        to_system: 110,
        min_loot: 10_000,
        ..FarmSettings::default()
    });
    Harness::new(snap, pinned(600, 10), config, at(12, 0)).await
}

#[tokio::test(start_paused = true)]
async fn farm_walks_a_target_from_scan_to_raid() {
    let h = farm_harness().await;
    let scheduler = scheduler(&h);

    // First sighting only records the target.
    assert_eq!(run(&scheduler, Feature::AutoFarm).await, JobOutcome::idle());
    assert_eq!(farm_state(&h), Some(FarmState::Idle));
    assert!(h.sim.sent_fleets().is_empty());

    // Seen again: a wave of two probes, next look when they land.
    assert_eq!(
        run(&scheduler, Feature::AutoFarm).await,
        JobOutcome::Continue(vec![Duration::from_secs(600)])
    );
    assert_eq!(farm_state(&h), Some(FarmState::ProbesSent));
    let sent = h.sim.sent_fleets();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].mission, Mission::Spy);
    assert_eq!(sent[0].ships, Ships::of(ShipType::EspionageProbe, 2));

    // Report in: half of 70k loot fits in seven small cargos.
    tokio::time::sleep(Duration::from_secs(601)).await;
    assert_eq!(run(&scheduler, Feature::AutoFarm).await, JobOutcome::idle());
    assert_eq!(farm_state(&h), Some(FarmState::AttackSent));
    let sent = h.sim.sent_fleets();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].mission, Mission::Attack);
    assert_eq!(sent[1].destination, farm_target());
    assert_eq!(sent[1].ships, Ships::of(ShipType::SmallCargo, 7));
}

#[tokio::test(start_paused = true)]
async fn raided_target_is_left_alone_until_the_raid_lands() {
    let h = farm_harness().await;
    let scheduler = scheduler(&h);

    run(&scheduler, Feature::AutoFarm).await;
    run(&scheduler, Feature::AutoFarm).await;
    tokio::time::sleep(Duration::from_secs(601)).await;
    run(&scheduler, Feature::AutoFarm).await;
    assert_eq!(farm_state(&h), Some(FarmState::AttackSent));

    // Raid lands at 12:20:01; nothing goes near the target before that.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(run(&scheduler, Feature::AutoFarm).await, JobOutcome::idle());
    assert_eq!(farm_state(&h), Some(FarmState::AttackSent));
    let missions: Vec<Mission> = h.sim.sent_fleets().iter().map(|f| f.mission).collect();
    assert_eq!(missions, vec![Mission::Spy, Mission::Attack]);

    // Landed: fresh probes before any new raid.
    tokio::time::sleep(Duration::from_secs(600)).await;
    run(&scheduler, Feature::AutoFarm).await;
    assert_eq!(farm_state(&h), Some(FarmState::ProbesSent));
    let missions: Vec<Mission> = h.sim.sent_fleets().iter().map(|f| f.mission).collect();
    assert_eq!(missions, vec![Mission::Spy, Mission::Attack, Mission::Spy]);
}

#[tokio::test(start_paused = true)]
async fn farm_without_its_section_stops() {
    let h = Harness::new(snapshot(two_planets()), pinned(600, 10), settings("{}"), at(12, 0)).await;
    let scheduler = scheduler(&h);

    assert_eq!(run(&scheduler, Feature::AutoFarm).await, JobOutcome::Stop);
    assert!(h.sim.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Colonize
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn colony_ship_goes_once_then_the_feature_stops() {
    let mut celestials = two_planets();
    celestials[0].ships.set(ShipType::ColonyShip, 1);
    let wanted = Coordinate::planet(1, 105, 7);
    let mut config = settings("{}");
    config.colonize = Some(ColonizeSettings {
        targets: vec![wanted],
    });
    let h = Harness::new(snapshot(celestials), pinned(600, 10), config, at(12, 0)).await;
    let scheduler = scheduler(&h);

    assert_eq!(run(&scheduler, Feature::Colonize).await, JobOutcome::idle());
    let sent = h.sim.sent_fleets();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].mission, Mission::Colonize);
    assert_eq!(sent[0].destination, wanted);
    assert_eq!(sent[0].ships, Ships::of(ShipType::ColonyShip, 1));

    // The only target now has a colony ship on its way.
    assert_eq!(run(&scheduler, Feature::Colonize).await, JobOutcome::Stop);
    assert_eq!(h.sim.sent_fleets().len(), 1);
}

// ---------------------------------------------------------------------------
// Expeditions
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn expeditions_fill_the_expedition_slots() {
    let mut config = settings("{}");
    config.expeditions = Some(ExpeditionSettings {
        fleet: Ships::of(ShipType::SmallCargo, 3),
        ..ExpeditionSettings::default()
    });
    let h = Harness::new(snapshot(two_planets()), pinned(600, 10), config, at(12, 0)).await;
    let scheduler = scheduler(&h);

    assert_eq!(run(&scheduler, Feature::Expeditions).await, JobOutcome::Delay);

    let sent = h.sim.sent_fleets();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|o| o.mission == Mission::Expedition));
    assert_eq!(h.ships_on(1), Ships::of(ShipType::SmallCargo, 4));
    assert_eq!(h.ctx.snapshot().slots.expedition_in_use, 2);
}

// ---------------------------------------------------------------------------
// Defender
// ---------------------------------------------------------------------------

fn raid_on_home(id: u64) -> HostileEvent {
    HostileEvent {
        id: EventId(id),
        mission: Mission::Attack,
        origin: Coordinate::planet(1, 200, 3),
        destination: home(),
        arrival_time: at(12, 30),
        ships: None,
    }
}

#[tokio::test(start_paused = true)]
async fn defender_saves_once_per_attack() {
    let json = r#"{ "fleet_save": { "wait_for_returns": "none", "recall": false } }"#;
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings(json), at(12, 0)).await;
    h.sim.push_hostile(raid_on_home(1));
    let scheduler = scheduler(&h);

    assert_eq!(run(&scheduler, Feature::Defender).await, JobOutcome::idle());
    let sent = h.sim.sent_fleets();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].origin, CelestialId(1));
    assert!(h.notes().iter().any(|n| n.contains("attacked")));

    // Same event on the next pass: already handled.
    run(&scheduler, Feature::Defender).await;
    assert_eq!(h.sim.sent_fleets().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn defender_ignores_probes_by_default() {
    let h = Harness::new(snapshot(two_planets()), pinned(3600, 100), settings("{}"), at(12, 0)).await;
    h.sim.push_hostile(HostileEvent {
        mission: Mission::Spy,
        ..raid_on_home(2)
    });
    let scheduler = scheduler(&h);

    run(&scheduler, Feature::Defender).await;
    assert!(h.sim.sent_fleets().is_empty());
    assert!(h.notes().is_empty());
}

// ---------------------------------------------------------------------------
// Economy and the asleep guard
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn mine_starts_a_build_and_waits_for_it() {
    let mut main = planet(1, home());
    main.buildings.metal_mine = 5;
    main.resources = Resources::new(10_000, 10_000, 0);
    let h = Harness::new(snapshot(vec![main]), pinned(600, 10), settings("{}"), at(12, 0)).await;
    let scheduler = scheduler(&h);

    let outcome = Handlers
        .run(TimerKey::sub(Feature::AutoMine, CelestialId(1)), &scheduler)
        .await
        .unwrap();

    assert_eq!(
        h.sim.calls(),
        vec![ProviderCall::Build(CelestialId(1), Buildable::SolarPlant)]
    );
    let JobOutcome::Continue(hints) = outcome else {
        panic!("expected a continue, got {outcome:?}");
    };
    assert_eq!(hints.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn spenders_do_nothing_while_asleep() {
    let mut config = settings("{}");
    config.farm = Some(FarmSettings::default());
    let h = Harness::new(snapshot(two_planets()), pinned(600, 10), config, at(12, 0)).await;
    h.ctx.state.lock().asleep = true;
    let scheduler = scheduler(&h);

    assert_eq!(run(&scheduler, Feature::AutoFarm).await, JobOutcome::idle());
    assert_eq!(run(&scheduler, Feature::Expeditions).await, JobOutcome::idle());
    assert!(h.sim.calls().is_empty());
}
