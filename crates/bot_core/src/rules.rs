//! Game formulas.
//!
//! [`GameRules`] is the seam between decision logic and the numbers of a
//! particular rule set. [`StandardRules`] carries the classic published
//! formulas; tests swap in wrappers that pin flight times.

use crate::buildables::{level_of, Buildable, Buildings, Facilities, ResearchType, Researches};
use crate::resources::{ExchangeRatio, ResourceRates, Resources};
use crate::ships::{ShipType, Ships};
use crate::types::{Celestial, Coordinate, Mission, PlayerClass, Speed, Temperature, UniverseInfo};

/// Account-wide inputs every flight formula needs.
#[derive(Debug, Clone, Copy)]
pub struct FlightContext<'a> {
    pub universe: &'a UniverseInfo,
    pub researches: &'a Researches,
    pub class: PlayerClass,
}

/// One prospective leg, from `from` to `to`.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub from: &'a Coordinate,
    pub to: &'a Coordinate,
    pub ships: &'a Ships,
    pub speed: Speed,
    pub mission: Mission,
}

pub trait GameRules: Send + Sync {
    fn distance(&self, from: &Coordinate, to: &Coordinate, universe: &UniverseInfo) -> u64;

    /// Base speed after drive research and class bonuses.
    fn ship_speed(&self, ship: ShipType, researches: &Researches, class: PlayerClass) -> u64;

    /// One-way duration in seconds.
    fn flight_time(&self, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> u64;

    /// Deuterium burned by one leg.
    fn fuel_consumption(&self, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> u64;

    fn cargo_capacity(&self, ships: &Ships, researches: &Researches, class: PlayerClass) -> u64;

    /// Deuterium the fleet can carry for its own flight.
    fn fuel_capacity(&self, ships: &Ships, researches: &Researches, class: PlayerClass) -> u64 {
        self.cargo_capacity(ships, researches, class)
    }

    /// Time spent holding in deep space by an expedition.
    fn expedition_hold_secs(&self) -> u64 {
        3600
    }

    /// Cost of raising `buildable` to `level`.
    fn building_cost(&self, buildable: Buildable, level: u32) -> Resources;

    /// Cost of raising `research` to `level`.
    fn research_cost(&self, research: ResearchType, level: u32) -> Resources;

    fn ship_cost(&self, ship: ShipType) -> Resources;

    fn building_time(
        &self,
        buildable: Buildable,
        level: u32,
        facilities: &Facilities,
        universe: &UniverseInfo,
    ) -> u64;

    fn research_time(
        &self,
        research: ResearchType,
        level: u32,
        lab_level: u32,
        universe: &UniverseInfo,
    ) -> u64;

    /// Hourly production of a celestial with the given building levels.
    fn production(
        &self,
        buildings: &Buildings,
        temperature: &Temperature,
        universe: &UniverseInfo,
        researches: &Researches,
        class: PlayerClass,
    ) -> ResourceRates;

    /// Energy produced minus energy consumed.
    fn energy_balance(
        &self,
        buildings: &Buildings,
        temperature: &Temperature,
        researches: &Researches,
    ) -> i64;

    fn storage_capacity(&self, level: u32) -> u64;

    /// Days until the next level of a mine pays for itself.
    /// Non-mines never pay back and yield infinity.
    fn days_of_investment_return(
        &self,
        celestial: &Celestial,
        buildable: Buildable,
        universe: &UniverseInfo,
        researches: &Researches,
        class: PlayerClass,
        ratio: &ExchangeRatio,
    ) -> f64 {
        if !Buildable::MINES.contains(&buildable) {
            return f64::INFINITY;
        }
        let current = level_of(&celestial.buildings, &celestial.facilities, buildable);
        let mut upgraded = celestial.buildings;
        let mut facilities = celestial.facilities;
        crate::buildables::set_level_of(&mut upgraded, &mut facilities, buildable, current + 1);
        let before = self.production(
            &celestial.buildings,
            &celestial.temperature,
            universe,
            researches,
            class,
        );
        let after = self.production(&upgraded, &celestial.temperature, universe, researches, class);
        let gain_per_hour = (after.metal - before.metal)
            + (after.crystal - before.crystal) * ratio.metal / ratio.crystal
            + (after.deuterium - before.deuterium) * ratio.metal / ratio.deuterium;
        if gain_per_hour <= 0.0 {
            return f64::INFINITY;
        }
        let cost = self
            .building_cost(buildable, current + 1)
            .conversion_value(ratio);
        cost / (gain_per_hour * 24.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drive {
    None,
    Combustion,
    Impulse,
    Hyperspace,
}

struct ShipStats {
    cost: Resources,
    cargo: u64,
    speed: u64,
    consumption: u64,
    drive: Drive,
}

fn ship_stats(ship: ShipType) -> ShipStats {
    let s = |m, c, d, cargo, speed, consumption, drive| ShipStats {
        cost: Resources::new(m, c, d),
        cargo,
        speed,
        consumption,
        drive,
    };
    match ship {
        ShipType::LightFighter => s(3000, 1000, 0, 50, 12_500, 20, Drive::Combustion),
        ShipType::HeavyFighter => s(6000, 4000, 0, 100, 10_000, 75, Drive::Impulse),
        ShipType::Cruiser => s(20_000, 7000, 2000, 800, 15_000, 300, Drive::Impulse),
        ShipType::Battleship => s(45_000, 15_000, 0, 1500, 10_000, 500, Drive::Hyperspace),
        ShipType::Battlecruiser => s(30_000, 40_000, 15_000, 750, 10_000, 250, Drive::Hyperspace),
        ShipType::Bomber => s(50_000, 25_000, 15_000, 500, 4000, 700, Drive::Impulse),
        ShipType::Destroyer => s(60_000, 50_000, 15_000, 2000, 5000, 1000, Drive::Hyperspace),
        ShipType::Deathstar => s(
            5_000_000,
            4_000_000,
            1_000_000,
            1_000_000,
            100,
            1,
            Drive::Hyperspace,
        ),
        ShipType::SmallCargo => s(2000, 2000, 0, 5000, 5000, 10, Drive::Combustion),
        ShipType::LargeCargo => s(6000, 6000, 0, 25_000, 7500, 50, Drive::Combustion),
        ShipType::ColonyShip => s(10_000, 20_000, 10_000, 7500, 2500, 1000, Drive::Impulse),
        ShipType::Recycler => s(10_000, 6000, 2000, 20_000, 2000, 300, Drive::Combustion),
        ShipType::EspionageProbe => s(0, 1000, 0, 5, 100_000_000, 1, Drive::Combustion),
        ShipType::SolarSatellite => s(0, 2000, 500, 0, 0, 0, Drive::None),
        ShipType::Crawler => s(2000, 2000, 1000, 0, 0, 0, Drive::None),
        ShipType::Reaper => s(85_000, 55_000, 20_000, 10_000, 7000, 1100, Drive::Hyperspace),
        ShipType::Pathfinder => s(8000, 15_000, 8000, 10_000, 12_000, 300, Drive::Hyperspace),
    }
}

fn building_base(buildable: Buildable) -> (Resources, f64) {
    let r = Resources::new;
    match buildable {
        Buildable::MetalMine => (r(60, 15, 0), 1.5),
        Buildable::CrystalMine => (r(48, 24, 0), 1.6),
        Buildable::DeuteriumSynthesizer => (r(225, 75, 0), 1.5),
        Buildable::SolarPlant => (r(75, 30, 0), 1.5),
        Buildable::FusionReactor => (r(900, 360, 180), 1.8),
        Buildable::MetalStorage => (r(1000, 0, 0), 2.0),
        Buildable::CrystalStorage => (r(1000, 500, 0), 2.0),
        Buildable::DeuteriumTank => (r(1000, 1000, 0), 2.0),
        Buildable::RoboticsFactory => (r(400, 120, 200), 2.0),
        Buildable::Shipyard => (r(400, 200, 100), 2.0),
        Buildable::ResearchLab => (r(200, 400, 200), 2.0),
        Buildable::AllianceDepot => (r(20_000, 40_000, 0), 2.0),
        Buildable::MissileSilo => (r(20_000, 20_000, 1000), 2.0),
        Buildable::NaniteFactory => (r(1_000_000, 500_000, 100_000), 2.0),
        Buildable::Terraformer => (r(0, 50_000, 100_000), 2.0),
        Buildable::SpaceDock => (r(200, 0, 50), 5.0),
        Buildable::LunarBase | Buildable::SensorPhalanx => (r(20_000, 40_000, 20_000), 2.0),
        Buildable::JumpGate => (r(2_000_000, 4_000_000, 2_000_000), 2.0),
    }
}

fn research_base(research: ResearchType) -> (Resources, f64) {
    let r = Resources::new;
    match research {
        ResearchType::EspionageTechnology => (r(200, 1000, 200), 2.0),
        ResearchType::ComputerTechnology => (r(0, 400, 600), 2.0),
        ResearchType::WeaponsTechnology => (r(800, 200, 0), 2.0),
        ResearchType::ShieldingTechnology => (r(200, 600, 0), 2.0),
        ResearchType::ArmourTechnology => (r(1000, 0, 0), 2.0),
        ResearchType::EnergyTechnology => (r(0, 800, 400), 2.0),
        ResearchType::HyperspaceTechnology => (r(0, 4000, 2000), 2.0),
        ResearchType::CombustionDrive => (r(400, 0, 600), 2.0),
        ResearchType::ImpulseDrive => (r(2000, 4000, 600), 2.0),
        ResearchType::HyperspaceDrive => (r(10_000, 20_000, 6000), 2.0),
        ResearchType::LaserTechnology => (r(200, 100, 0), 2.0),
        ResearchType::IonTechnology => (r(1000, 300, 100), 2.0),
        ResearchType::PlasmaTechnology => (r(2000, 4000, 1000), 2.0),
        ResearchType::IntergalacticResearchNetwork => (r(240_000, 400_000, 160_000), 2.0),
        ResearchType::Astrophysics => (r(4000, 8000, 4000), 1.75),
    }
}

fn scaled_cost((base, factor): (Resources, f64), level: u32) -> Resources {
    let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
    base.scale(factor.powi(exponent))
}

fn axis_distance(a: u32, b: u32, size: u32, donut: bool) -> u64 {
    let direct = u64::from(a.abs_diff(b));
    if donut && size > 0 {
        direct.min(u64::from(size) - direct)
    } else {
        direct
    }
}

/// Classic formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn slowest_speed(&self, ships: &Ships, researches: &Researches, class: PlayerClass) -> u64 {
        ships
            .iter()
            .filter(|(ship, _)| ship.is_movable())
            .map(|(ship, _)| self.ship_speed(ship, researches, class))
            .min()
            .unwrap_or(0)
            .max(1)
    }
}

impl GameRules for StandardRules {
    fn distance(&self, from: &Coordinate, to: &Coordinate, universe: &UniverseInfo) -> u64 {
        if from.galaxy != to.galaxy {
            return 20_000
                * axis_distance(from.galaxy, to.galaxy, universe.galaxies, universe.donut_galaxy);
        }
        if from.system != to.system {
            return 2700
                + 95 * axis_distance(from.system, to.system, universe.systems, universe.donut_system);
        }
        if from.position != to.position {
            return 1000 + 5 * u64::from(from.position.abs_diff(to.position));
        }
        5
    }

    fn ship_speed(&self, ship: ShipType, researches: &Researches, class: PlayerClass) -> u64 {
        let stats = ship_stats(ship);
        let drive_bonus = match stats.drive {
            Drive::None => 0.0,
            Drive::Combustion => 0.1 * f64::from(researches.combustion_drive),
            Drive::Impulse => 0.2 * f64::from(researches.impulse_drive),
            Drive::Hyperspace => 0.3 * f64::from(researches.hyperspace_drive),
        };
        let class_bonus = match class {
            PlayerClass::Collector if ship.is_cargo() => 1.0,
            PlayerClass::General if ship.is_combat() || ship == ShipType::Recycler => 1.0,
            _ => 0.0,
        };
        (stats.speed as f64 * (1.0 + drive_bonus + class_bonus)).round() as u64
    }

    fn flight_time(&self, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> u64 {
        let distance = self.distance(leg.from, leg.to, ctx.universe) as f64;
        let slowest = self.slowest_speed(leg.ships, ctx.researches, ctx.class) as f64;
        let universe_speed = f64::from(ctx.universe.fleet_speed_for(leg.mission));
        let pct = f64::from(leg.speed.0).max(1.0);
        let secs = (35_000.0 / pct * (distance * 10.0 / slowest).sqrt() + 10.0) / universe_speed;
        (secs.round() as u64).max(1)
    }

    fn fuel_consumption(&self, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> u64 {
        let distance = self.distance(leg.from, leg.to, ctx.universe) as f64;
        let duration = self.flight_time(ctx, leg) as f64;
        let universe_speed = f64::from(ctx.universe.fleet_speed_for(leg.mission));
        let t = (duration * universe_speed - 10.0).max(1.0);
        let mut consumption = 0.0;
        for (ship, count) in leg.ships.iter().filter(|(s, _)| s.is_movable()) {
            let stats = ship_stats(ship);
            let speed = self.ship_speed(ship, ctx.researches, ctx.class).max(1) as f64;
            let sv = 35_000.0 / t * (distance * 10.0 / speed).sqrt();
            consumption += (stats.consumption * count) as f64 * distance / 35_000.0
                * (sv / 10.0 + 1.0).powi(2);
        }
        let class_factor = if ctx.class == PlayerClass::General {
            0.75
        } else {
            1.0
        };
        let fuel = (consumption.round() + 1.0) * class_factor * ctx.universe.fuel_consumption_factor;
        fuel.ceil() as u64
    }

    fn cargo_capacity(&self, ships: &Ships, researches: &Researches, class: PlayerClass) -> u64 {
        let tech_bonus = 0.05 * f64::from(researches.hyperspace_technology);
        ships
            .iter()
            .map(|(ship, count)| {
                let class_bonus = if class == PlayerClass::Collector && ship.is_cargo() {
                    0.25
                } else {
                    0.0
                };
                let per_ship = ship_stats(ship).cargo as f64 * (1.0 + tech_bonus + class_bonus);
                per_ship.floor() as u64 * count
            })
            .sum()
    }

    fn building_cost(&self, buildable: Buildable, level: u32) -> Resources {
        scaled_cost(building_base(buildable), level)
    }

    fn research_cost(&self, research: ResearchType, level: u32) -> Resources {
        scaled_cost(research_base(research), level)
    }

    fn ship_cost(&self, ship: ShipType) -> Resources {
        ship_stats(ship).cost
    }

    fn building_time(
        &self,
        buildable: Buildable,
        level: u32,
        facilities: &Facilities,
        universe: &UniverseInfo,
    ) -> u64 {
        let cost = self.building_cost(buildable, level);
        let nanite = 2f64.powi(i32::try_from(facilities.nanite_factory).unwrap_or(0));
        let divisor = 2500.0
            * (1.0 + f64::from(facilities.robotics_factory))
            * nanite
            * f64::from(universe.economy_speed.max(1));
        let hours = (cost.metal + cost.crystal) as f64 / divisor;
        ((hours * 3600.0).round() as u64).max(1)
    }

    fn research_time(
        &self,
        research: ResearchType,
        level: u32,
        lab_level: u32,
        universe: &UniverseInfo,
    ) -> u64 {
        let cost = self.research_cost(research, level);
        let divisor =
            1000.0 * (1.0 + f64::from(lab_level)) * f64::from(universe.economy_speed.max(1));
        let hours = (cost.metal + cost.crystal) as f64 / divisor;
        ((hours * 3600.0).round() as u64).max(1)
    }

    fn production(
        &self,
        buildings: &Buildings,
        temperature: &Temperature,
        universe: &UniverseInfo,
        researches: &Researches,
        class: PlayerClass,
    ) -> ResourceRates {
        let speed = f64::from(universe.economy_speed.max(1));
        let curve = |base: f64, level: u32| {
            base * f64::from(level) * 1.1f64.powi(i32::try_from(level).unwrap_or(0))
        };
        let plasma = f64::from(researches.plasma_technology);
        let class_bonus = if class == PlayerClass::Collector {
            0.25
        } else {
            0.0
        };
        let metal = curve(30.0, buildings.metal_mine) * (1.0 + 0.01 * plasma + class_bonus);
        let crystal = curve(20.0, buildings.crystal_mine) * (1.0 + 0.0066 * plasma + class_bonus);
        let deuterium = curve(10.0, buildings.deuterium_synthesizer)
            * (1.44 - 0.004 * temperature.average())
            * (1.0 + 0.0033 * plasma + class_bonus);
        ResourceRates {
            metal: (metal + 30.0) * speed,
            crystal: (crystal + 15.0) * speed,
            deuterium: deuterium.max(0.0) * speed,
        }
    }

    fn energy_balance(
        &self,
        buildings: &Buildings,
        _temperature: &Temperature,
        researches: &Researches,
    ) -> i64 {
        let curve = |base: f64, level: u32| {
            base * f64::from(level) * 1.1f64.powi(i32::try_from(level).unwrap_or(0))
        };
        let fusion = 30.0
            * f64::from(buildings.fusion_reactor)
            * (1.05 + 0.01 * f64::from(researches.energy_technology))
                .powi(i32::try_from(buildings.fusion_reactor).unwrap_or(0));
        let produced = curve(20.0, buildings.solar_plant) + fusion;
        let consumed = curve(10.0, buildings.metal_mine)
            + curve(10.0, buildings.crystal_mine)
            + curve(20.0, buildings.deuterium_synthesizer);
        produced.floor() as i64 - consumed.ceil() as i64
    }

    fn storage_capacity(&self, level: u32) -> u64 {
        (5000.0 * (2.5 * (20.0 * f64::from(level) / 33.0).exp()).floor()) as u64
    }
}
