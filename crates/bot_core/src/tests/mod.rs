use super::*;
use crate::test_fixtures::{planet, researches, universe, PinnedRules};

mod farm;

// --- Shared test helpers ------------------------------------------------

fn home() -> Coordinate {
    Coordinate::planet(1, 100, 4)
}

fn pinned(one_way_secs: u64, fuel: u64) -> PinnedRules {
    PinnedRules {
        one_way_secs,
        fuel: Some(fuel),
    }
}

fn hypothesis(destination: Coordinate, fuel: u64, duration_secs: u64) -> FleetHypothesis {
    FleetHypothesis {
        origin: home(),
        destination,
        ships: Ships::of(ShipType::SmallCargo, 5),
        mission: Mission::Deploy,
        speed: Speed::FULL,
        duration_secs,
        fuel,
    }
}

fn home_planet_with_deuterium(deuterium: u64) -> Celestial {
    let mut c = planet(1, home());
    c.resources = Resources::deuterium(deuterium);
    c.ships = Ships::of(ShipType::SmallCargo, 5);
    c
}

fn flight_ctx<'a>(u: &'a UniverseInfo, r: &'a Researches, class: PlayerClass) -> FlightContext<'a> {
    FlightContext {
        universe: u,
        researches: r,
        class,
    }
}

#[test]
fn fixtures_are_consistent() {
    let u = universe();
    assert_eq!(u.systems, 499);
    assert!(!u.donut_system);
    assert_eq!(researches().expedition_slots(), 2);
}
