//! Shared test fixtures for bot_core and downstream crates.
//!
//! `universe()` is a small non-donut universe at speed 1. `planet()` and
//! `moon()` build bare celestials that tests then dress up field by field.
//! `PinnedRules` keeps the standard formulas but fixes flight time and fuel
//! so timing scenarios read like the numbers in their assertions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    Buildable, Buildings, Celestial, CelestialId, Coordinate, EspionageReport, Facilities, Fields,
    Fleet, FleetId, FlightContext, GalaxySlot, GameRules, Leg, Mission, Occupant, PlayerClass,
    ResearchType, Researches, ResourceRates, Resources, ShipType, Ships, Slots, StandardRules,
    Temperature, UniverseInfo,
};

pub fn universe() -> UniverseInfo {
    UniverseInfo {
        galaxies: 9,
        systems: 499,
        donut_galaxy: false,
        donut_system: false,
        economy_speed: 1,
        fleet_speed_peaceful: 1,
        fleet_speed_war: 1,
        fleet_speed_holding: 1,
        fuel_consumption_factor: 1.0,
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// 2024-05-10 at the given UTC hour and minute.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, hour, minute, 0)
        .single()
        .unwrap()
}

pub fn planet(id: u64, coordinate: Coordinate) -> Celestial {
    Celestial {
        id: CelestialId(id),
        name: format!("Colony {id}"),
        coordinate,
        temperature: Temperature { min: 10, max: 50 },
        fields: Fields {
            built: 10,
            total: 163,
        },
        resources: Resources::default(),
        production: ResourceRates {
            metal: 3600.0,
            crystal: 1800.0,
            deuterium: 900.0,
        },
        buildings: Buildings::default(),
        facilities: Facilities::default(),
        ships: Ships::default(),
        constructions: crate::Constructions::default(),
        production_queue: Vec::new(),
    }
}

pub fn moon(id: u64, coordinate: Coordinate) -> Celestial {
    let mut c = planet(id, coordinate);
    c.name = format!("Moon {id}");
    c.production = ResourceRates::default();
    c.fields = Fields { built: 1, total: 1 };
    c
}

/// A mid-game planet with mines, robotics and a shipyard.
pub fn developed_planet(id: u64, coordinate: Coordinate) -> Celestial {
    let mut c = planet(id, coordinate);
    c.buildings = Buildings {
        metal_mine: 12,
        crystal_mine: 10,
        deuterium_synthesizer: 6,
        solar_plant: 14,
        metal_storage: 3,
        crystal_storage: 2,
        deuterium_tank: 1,
        ..Buildings::default()
    };
    c.facilities = Facilities {
        robotics_factory: 4,
        shipyard: 4,
        research_lab: 5,
        ..Facilities::default()
    };
    c.resources = Resources::new(40_000, 20_000, 8000);
    c
}

pub fn researches() -> Researches {
    let mut r = Researches::default();
    r.set_level(ResearchType::CombustionDrive, 6);
    r.set_level(ResearchType::ImpulseDrive, 4);
    r.set_level(ResearchType::EspionageTechnology, 4);
    r.set_level(ResearchType::Astrophysics, 4);
    r
}

pub fn slots(total: u32, in_use: u32) -> Slots {
    Slots {
        total,
        in_use,
        expedition_total: 2,
        expedition_in_use: 0,
    }
}

pub fn fleet(
    id: u64,
    mission: Mission,
    origin: Coordinate,
    destination: Coordinate,
    arrival: DateTime<Utc>,
    back: Option<DateTime<Utc>>,
) -> Fleet {
    Fleet {
        id: FleetId(id),
        mission,
        return_flight: false,
        origin,
        destination,
        ships: Ships::of(ShipType::SmallCargo, 1),
        payload: Resources::default(),
        start_time: arrival - Duration::hours(1),
        arrival_time: arrival,
        back_time: back,
    }
}

pub fn inactive_slot(coordinate: Coordinate) -> GalaxySlot {
    GalaxySlot {
        coordinate,
        occupant: Some(Occupant {
            name: "idler".to_string(),
            rank: 900,
            inactive: true,
            ..Occupant::default()
        }),
        has_moon: false,
        debris: None,
    }
}

pub fn report(
    coordinate: Coordinate,
    timestamp: DateTime<Utc>,
    resources: Resources,
    complete: bool,
) -> EspionageReport {
    EspionageReport {
        coordinate,
        timestamp,
        resources,
        loot_ratio: 0.5,
        fleet: complete.then(Ships::default),
        defence_units: complete.then_some(0),
        inactive: true,
    }
}

/// Standard formulas with a fixed one-way flight time and, optionally, fuel.
#[derive(Debug, Clone, Copy)]
pub struct PinnedRules {
    pub one_way_secs: u64,
    pub fuel: Option<u64>,
}

impl GameRules for PinnedRules {
    fn distance(&self, from: &Coordinate, to: &Coordinate, universe: &UniverseInfo) -> u64 {
        StandardRules.distance(from, to, universe)
    }

    fn ship_speed(&self, ship: ShipType, researches: &Researches, class: PlayerClass) -> u64 {
        StandardRules.ship_speed(ship, researches, class)
    }

    fn flight_time(&self, _ctx: &FlightContext<'_>, _leg: &Leg<'_>) -> u64 {
        self.one_way_secs
    }

    fn fuel_consumption(&self, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> u64 {
        self.fuel
            .unwrap_or_else(|| StandardRules.fuel_consumption(ctx, leg))
    }

    fn cargo_capacity(&self, ships: &Ships, researches: &Researches, class: PlayerClass) -> u64 {
        StandardRules.cargo_capacity(ships, researches, class)
    }

    fn building_cost(&self, buildable: Buildable, level: u32) -> Resources {
        StandardRules.building_cost(buildable, level)
    }

    fn research_cost(&self, research: ResearchType, level: u32) -> Resources {
        StandardRules.research_cost(research, level)
    }

    fn ship_cost(&self, ship: ShipType) -> Resources {
        StandardRules.ship_cost(ship)
    }

    fn building_time(
        &self,
        buildable: Buildable,
        level: u32,
        facilities: &Facilities,
        universe: &UniverseInfo,
    ) -> u64 {
        StandardRules.building_time(buildable, level, facilities, universe)
    }

    fn research_time(
        &self,
        research: ResearchType,
        level: u32,
        lab_level: u32,
        universe: &UniverseInfo,
    ) -> u64 {
        StandardRules.research_time(research, level, lab_level, universe)
    }

    fn production(
        &self,
        buildings: &Buildings,
        temperature: &Temperature,
        universe: &UniverseInfo,
        researches: &Researches,
        class: PlayerClass,
    ) -> ResourceRates {
        StandardRules.production(buildings, temperature, universe, researches, class)
    }

    fn energy_balance(
        &self,
        buildings: &Buildings,
        temperature: &Temperature,
        researches: &Researches,
    ) -> i64 {
        StandardRules.energy_balance(buildings, temperature, researches)
    }

    fn storage_capacity(&self, level: u32) -> u64 {
        StandardRules.storage_capacity(level)
    }
}
