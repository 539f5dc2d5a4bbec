//! Planners that decide fleet movements: repatriation, expeditions,
//! harvesting, colonization, farming and defence.

use bot_control::*;
use bot_core::test_fixtures::{at, inactive_slot, planet, report, researches, slots, universe, PinnedRules};
use bot_core::*;

fn home() -> Coordinate {
    Coordinate::planet(1, 100, 4)
}

// ---------------------------------------------------------------------------
// AutoRepatriate
// ---------------------------------------------------------------------------

#[test]
fn surplus_is_shipped_home_minus_fuel() {
    let u = universe();
    let r = Researches::default();
    let ctx = FlightContext {
        universe: &u,
        researches: &r,
        class: PlayerClass::None,
    };
    let rules = PinnedRules {
        one_way_secs: 3600,
        fuel: Some(1000),
    };

    let target = planet(1, home());
    let mut rich = planet(2, Coordinate::planet(1, 120, 5));
    rich.resources = Resources::new(300_000, 100_000, 50_000);
    rich.ships = Ships::of(ShipType::LargeCargo, 10);
    let mut poor = planet(3, Coordinate::planet(1, 130, 5));
    poor.resources = Resources::new(5000, 0, 0);
    poor.ships = Ships::of(ShipType::LargeCargo, 10);

    let all = vec![target, rich, poor];
    let plans = plan_repatriation(&rules, &ctx, &all, &RepatriateSettings::default());
    assert_eq!(
        plans,
        vec![TransferPlan {
            origin: CelestialId(2),
            from: Coordinate::planet(1, 120, 5),
            to: home(),
            ships: Ships::of(ShipType::LargeCargo, 10),
            payload: Resources::new(100_000, 100_000, 49_000),
            fuel: 1000,
        }]
    );
}

#[test]
fn repatriation_sends_only_the_hulls_it_needs() {
    let u = universe();
    let r = Researches::default();
    let ctx = FlightContext {
        universe: &u,
        researches: &r,
        class: PlayerClass::None,
    };
    let rules = PinnedRules {
        one_way_secs: 3600,
        fuel: Some(500),
    };
    let mut colony = planet(2, Coordinate::planet(1, 120, 5));
    colony.resources = Resources::new(100_000, 20_500, 500);
    colony.ships = Ships::of(ShipType::LargeCargo, 40);
    let all = vec![planet(1, home()), colony];

    let plans = plan_repatriation(&rules, &ctx, &all, &RepatriateSettings::default());
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].ships, Ships::of(ShipType::LargeCargo, 5));
    assert_eq!(plans[0].payload, Resources::new(100_000, 20_500, 0));
}

#[test]
fn repatriation_leaves_room_for_its_own_fuel() {
    let u = universe();
    let r = Researches::default();
    let ctx = FlightContext {
        universe: &u,
        researches: &r,
        class: PlayerClass::None,
    };
    let rules = PinnedRules {
        one_way_secs: 3600,
        fuel: Some(500),
    };
    let mut colony = planet(2, Coordinate::planet(1, 120, 5));
    colony.resources = Resources::new(125_000, 0, 500);
    colony.ships = Ships::of(ShipType::LargeCargo, 40);
    let all = vec![planet(1, home()), colony];

    let plans = plan_repatriation(&rules, &ctx, &all, &RepatriateSettings::default());
    assert_eq!(plans.len(), 1);
    // Five hulls hold exactly the metal; the fuel needs a sixth.
    assert_eq!(plans[0].ships, Ships::of(ShipType::LargeCargo, 6));
    assert_eq!(plans[0].payload, Resources::new(125_000, 0, 0));
    let hold = rules.cargo_capacity(&plans[0].ships, &r, PlayerClass::None);
    assert!(plans[0].payload.total() + plans[0].fuel <= hold);
}

// ---------------------------------------------------------------------------
// Expeditions
// ---------------------------------------------------------------------------

#[test]
fn one_fleet_per_free_slot_while_ships_last() {
    let settings = ExpeditionSettings::default();
    let mut origin = planet(1, home());
    origin.ships = Ships::of(ShipType::LargeCargo, 45);
    origin.ships.set(ShipType::EspionageProbe, 2);
    origin.ships.set(ShipType::Pathfinder, 3);

    let mut free = slots(10, 0);
    free.expedition_total = 3;
    let fleets = plan_expeditions(&origin, &free, &settings);
    assert_eq!(fleets, vec![settings.fleet, settings.fleet]);

    free.expedition_in_use = 3;
    assert!(plan_expeditions(&origin, &free, &settings).is_empty());
}

#[test]
fn expedition_origin_has_most_cargo() {
    let r = Researches::default();
    let mut small = planet(1, home());
    small.ships = Ships::of(ShipType::SmallCargo, 10);
    let mut big = planet(2, Coordinate::planet(2, 10, 10));
    big.ships = Ships::of(ShipType::LargeCargo, 10);
    let all = vec![small, big];
    let origin = expedition_origin(&StandardRules, &r, PlayerClass::None, &all, None);
    assert_eq!(origin.map(|c| c.id), Some(CelestialId(2)));
    assert_eq!(
        expedition_target(&all[1].coordinate, &ExpeditionSettings::default()),
        Coordinate::planet(2, 10, EXPEDITION_POSITION)
    );
}

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

#[test]
fn debris_at_own_slots_is_collected() {
    let r = Researches::default();
    let mut own = planet(1, home());
    own.ships = Ships::of(ShipType::Recycler, 3);
    let all = vec![own];

    let mut field = inactive_slot(home());
    field.occupant = None;
    field.debris = Some(Resources::new(30_000, 20_000, 0));
    let mut foreign = inactive_slot(Coordinate::planet(1, 200, 1));
    foreign.debris = Some(Resources::new(90_000, 0, 0));

    let plans = plan_harvests(
        &StandardRules,
        &r,
        PlayerClass::None,
        &all,
        &[field, foreign],
        &HarvestSettings::default(),
    );
    assert_eq!(
        plans,
        vec![HarvestPlan {
            origin: CelestialId(1),
            from: home(),
            field: Coordinate::debris(1, 100, 4),
            ships: Ships::of(ShipType::Recycler, 3),
        }]
    );
}

#[test]
fn small_fields_are_skipped() {
    let r = Researches::default();
    let mut own = planet(1, home());
    own.ships = Ships::of(ShipType::Recycler, 3);
    let mut field = inactive_slot(home());
    field.debris = Some(Resources::new(500, 0, 0));
    let plans = plan_harvests(
        &StandardRules,
        &r,
        PlayerClass::None,
        &[own],
        &[field],
        &HarvestSettings::default(),
    );
    assert!(plans.is_empty());
}

// ---------------------------------------------------------------------------
// Colonize
// ---------------------------------------------------------------------------

#[test]
fn first_free_target_is_colonized() {
    let u = universe();
    let r = researches();
    let mut own = planet(1, home());
    own.ships = Ships::of(ShipType::ColonyShip, 1);
    let taken = Coordinate::planet(1, 101, 8);
    let settings = ColonizeSettings {
        targets: vec![home(), taken, Coordinate::planet(1, 102, 8)],
    };
    let plan = plan_colonization(&StandardRules, &u, &r, &[own], &[taken], &settings);
    assert_eq!(
        plan,
        Ok(ColonizePlan {
            from: home(),
            to: Coordinate::planet(1, 102, 8),
        })
    );
}

#[test]
fn colonization_stops_at_cap_or_without_ship() {
    let u = universe();
    let r = researches();
    let settings = ColonizeSettings {
        targets: vec![Coordinate::planet(1, 102, 8)],
    };
    let three: Vec<Celestial> = (1..=3)
        .map(|i| planet(i, Coordinate::planet(1, 100 + u32::try_from(i).unwrap(), 1)))
        .collect();
    assert_eq!(
        plan_colonization(&StandardRules, &u, &r, &three, &[], &settings),
        Err(ColonizeSkip::PlanetCap)
    );
    assert_eq!(
        plan_colonization(&StandardRules, &u, &r, &three[..1], &[], &settings),
        Err(ColonizeSkip::NoColonyShip)
    );
    let done = ColonizeSettings {
        targets: vec![three[0].coordinate],
    };
    assert_eq!(
        plan_colonization(&StandardRules, &u, &r, &three[..1], &[], &done),
        Err(ColonizeSkip::NoTargetLeft)
    );
}

// ---------------------------------------------------------------------------
// AutoFarm
// ---------------------------------------------------------------------------

fn pending_table(coordinates: &[Coordinate]) -> FarmTable {
    let mut table = FarmTable::new();
    for _ in 0..2 {
        for c in coordinates {
            table.observe(inactive_slot(*c));
        }
    }
    table
}

#[test]
fn probe_waves_fit_available_probes() {
    let targets = [Coordinate::planet(1, 5, 1), Coordinate::planet(1, 5, 2)];
    let table = pending_table(&targets);
    assert_eq!(plan_probe_waves(&table, 5, 2).len(), 2);
    assert_eq!(plan_probe_waves(&table, 3, 2), vec![(targets[0], 2)]);
    assert!(plan_probe_waves(&table, 1, 2).is_empty());
}

#[test]
fn raids_carry_the_loot_and_respect_the_fleet() {
    let r = Researches::default();
    let settings = FarmSettings {
        min_loot: 10_000,
        ..FarmSettings::default()
    };
    let modest = Coordinate::planet(1, 5, 1);
    let rich = Coordinate::planet(1, 5, 2);
    let mut table = pending_table(&[modest, rich]);
    table
        .apply_report(
            report(modest, at(9, 0), Resources::new(40_000, 20_000, 0), true),
            &settings.report_policy(),
        )
        .unwrap();
    table
        .apply_report(
            report(rich, at(9, 0), Resources::new(100_000, 0, 0), true),
            &settings.report_policy(),
        )
        .unwrap();

    // loot is half the stock: 30 000 and 50 000 units
    let fleet = Ships::of(ShipType::SmallCargo, 12);
    let raids = plan_attacks(&StandardRules, &r, PlayerClass::None, &table, &fleet, &settings);
    assert_eq!(raids, vec![(rich, Ships::of(ShipType::SmallCargo, 10))]);

    let fleet = Ships::of(ShipType::SmallCargo, 20);
    let raids = plan_attacks(&StandardRules, &r, PlayerClass::None, &table, &fleet, &settings);
    assert_eq!(
        raids,
        vec![
            (rich, Ships::of(ShipType::SmallCargo, 10)),
            (modest, Ships::of(ShipType::SmallCargo, 6)),
        ]
    );
}

#[test]
fn farm_range_and_filter() {
    let settings = FarmSettings {
        galaxy: 2,
        from_system: 10,
        to_system: 20,
        ..FarmSettings::default()
    };
    assert!(settings.in_range(&Coordinate::planet(2, 15, 3)));
    assert!(!settings.in_range(&Coordinate::planet(1, 15, 3)));
    assert!(!settings.in_range(&Coordinate::planet(2, 21, 3)));

    let mut vacation = inactive_slot(Coordinate::planet(2, 15, 4));
    if let Some(o) = vacation.occupant.as_mut() {
        o.vacation = true;
    }
    let mut empty = inactive_slot(Coordinate::planet(2, 15, 5));
    empty.occupant = None;
    let kept = settings.farmable(vec![
        inactive_slot(Coordinate::planet(2, 15, 3)),
        vacation,
        empty,
    ]);
    assert_eq!(kept.len(), 1);
}

// ---------------------------------------------------------------------------
// Defender
// ---------------------------------------------------------------------------

fn event(id: u64, mission: Mission, origin: Coordinate, destination: Coordinate, hour: u32) -> HostileEvent {
    HostileEvent {
        id: EventId(id),
        mission,
        origin,
        destination,
        arrival_time: at(hour, 0),
        ships: Some(Ships::of(ShipType::Cruiser, 50)),
    }
}

#[test]
fn threats_group_by_target_and_skip_noise() {
    let own = vec![planet(1, home()), planet(2, Coordinate::planet(1, 120, 5))];
    let friend = Coordinate::planet(3, 3, 3);
    let enemy = Coordinate::planet(4, 4, 4);
    let mut probe = event(4, Mission::Spy, enemy, home(), 10);
    probe.ships = Some(Ships::of(ShipType::EspionageProbe, 3));
    let events = vec![
        event(1, Mission::Attack, enemy, home(), 14),
        event(2, Mission::Attack, enemy, home(), 12),
        event(3, Mission::Attack, friend, Coordinate::planet(1, 120, 5), 11),
        probe,
        event(5, Mission::Attack, enemy, Coordinate::planet(5, 5, 5), 9),
        event(6, Mission::Transport, enemy, Coordinate::planet(1, 120, 5), 9),
    ];
    let settings = DefenderSettings {
        ignore_origins: vec![friend],
        ..DefenderSettings::default()
    };

    let found = threats(&events, &own, &settings);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].celestial, CelestialId(1));
    assert_eq!(found[0].arrival, at(12, 0));
    assert_eq!(found[0].events.len(), 2);
    assert_eq!(found[0].min_save_secs(at(11, 0), &settings), 3600 + 600);
}
