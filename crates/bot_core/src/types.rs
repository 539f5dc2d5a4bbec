//! Type definitions for `bot_core`.
//!
//! Identity types, coordinates, universe parameters and the snapshots the
//! provider hands back for celestials and fleets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buildables::{Buildable, Buildings, Facilities, ResearchType};
use crate::resources::{ResourceRates, Resources};
use crate::ships::{ShipType, Ships};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(CelestialId);
numeric_id!(FleetId);
numeric_id!(EventId);

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CelestialType {
    Planet,
    Debris,
    Moon,
}

impl CelestialType {
    fn letter(self) -> char {
        match self {
            CelestialType::Planet => 'P',
            CelestialType::Debris => 'D',
            CelestialType::Moon => 'M',
        }
    }
}

/// Position of a body in the universe. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub galaxy: u32,
    pub system: u32,
    pub position: u32,
    pub kind: CelestialType,
}

/// Deep-space slot used as the destination of expeditions.
pub const EXPEDITION_POSITION: u32 = 16;
pub const MAX_PLANET_POSITION: u32 = 15;

impl Coordinate {
    pub fn new(galaxy: u32, system: u32, position: u32, kind: CelestialType) -> Self {
        Self {
            galaxy,
            system,
            position,
            kind,
        }
    }

    pub fn planet(galaxy: u32, system: u32, position: u32) -> Self {
        Self::new(galaxy, system, position, CelestialType::Planet)
    }

    pub fn moon(galaxy: u32, system: u32, position: u32) -> Self {
        Self::new(galaxy, system, position, CelestialType::Moon)
    }

    pub fn debris(galaxy: u32, system: u32, position: u32) -> Self {
        Self::new(galaxy, system, position, CelestialType::Debris)
    }

    #[must_use]
    pub fn with_kind(self, kind: CelestialType) -> Self {
        Self { kind, ..self }
    }

    /// Same galaxy, system and position regardless of body type.
    pub fn same_slot(&self, other: &Coordinate) -> bool {
        self.galaxy == other.galaxy && self.system == other.system && self.position == other.position
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}:{} {}]",
            self.galaxy,
            self.system,
            self.position,
            self.kind.letter()
        )
    }
}

// ---------------------------------------------------------------------------
// Universe / account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseInfo {
    pub galaxies: u32,
    pub systems: u32,
    pub donut_galaxy: bool,
    pub donut_system: bool,
    /// Economy speed multiplier for production and build times.
    pub economy_speed: u32,
    pub fleet_speed_peaceful: u32,
    pub fleet_speed_war: u32,
    pub fleet_speed_holding: u32,
    /// Global multiplier applied to predicted fuel (1.0 = standard).
    pub fuel_consumption_factor: f64,
}

impl UniverseInfo {
    pub fn fleet_speed_for(&self, mission: Mission) -> u32 {
        match mission {
            Mission::Attack => self.fleet_speed_war,
            Mission::Deploy | Mission::Expedition => self.fleet_speed_holding,
            Mission::Transport | Mission::Spy | Mission::Colonize | Mission::Harvest => {
                self.fleet_speed_peaceful
            }
        }
        .max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    #[default]
    None,
    Collector,
    General,
    Discoverer,
}

/// Fleet speed as a percentage of maximum (5..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Speed(pub u8);

impl Speed {
    pub const FULL: Speed = Speed(100);

    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Speeds the game lets this class pick, fastest first.
    pub fn allowed_for(class: PlayerClass) -> Vec<Speed> {
        let step = if class == PlayerClass::General { 5 } else { 10 };
        (1..=100 / step).rev().map(|i| Speed(i * step)).collect()
    }

    pub fn is_allowed_for(self, class: PlayerClass) -> bool {
        let step = if class == PlayerClass::General { 5 } else { 10 };
        self.0 >= step && self.0 <= 100 && self.0 % step == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    Attack,
    Transport,
    Deploy,
    Spy,
    Colonize,
    Harvest,
    Expedition,
}

// ---------------------------------------------------------------------------
// Celestials
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Temperature {
    pub min: i32,
    pub max: i32,
}

impl Temperature {
    pub fn average(&self) -> f64 {
        f64::from(self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Fields {
    pub built: u32,
    pub total: u32,
}

impl Fields {
    pub fn is_full(&self) -> bool {
        self.total > 0 && self.built >= self.total
    }
}

/// In-progress construction and research, as remaining seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constructions {
    pub building: Option<(Buildable, u64)>,
    pub research: Option<(ResearchType, u64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionItem {
    pub ship: ShipType,
    pub count: u64,
    /// Seconds until the whole item is finished.
    pub remaining_secs: u64,
}

/// A planet or moon owned by the account. Replaced wholesale on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Celestial {
    pub id: CelestialId,
    pub name: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub production: ResourceRates,
    #[serde(default)]
    pub buildings: Buildings,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default)]
    pub ships: Ships,
    #[serde(default)]
    pub constructions: Constructions,
    #[serde(default)]
    pub production_queue: Vec<ProductionItem>,
}

impl Celestial {
    pub fn is_moon(&self) -> bool {
        self.coordinate.kind == CelestialType::Moon
    }

    /// Seconds until the shipyard queue drains, if anything is queued.
    pub fn production_countdown(&self) -> Option<u64> {
        self.production_queue
            .iter()
            .map(|item| item.remaining_secs)
            .max()
    }
}

// ---------------------------------------------------------------------------
// Fleets
// ---------------------------------------------------------------------------

/// A dispatched movement as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub mission: Mission,
    pub return_flight: bool,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub ships: Ships,
    #[serde(default)]
    pub payload: Resources,
    pub start_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub back_time: Option<DateTime<Utc>>,
}

impl Fleet {
    /// When the ships are home again: the back time, or arrival for
    /// one-way/returning legs.
    pub fn home_time(&self) -> DateTime<Utc> {
        if self.return_flight {
            self.arrival_time
        } else {
            self.back_time.unwrap_or(self.arrival_time)
        }
    }

    /// Whether the fleet will land on `origin`-side coordinates when done.
    pub fn returns_to(&self, coordinate: &Coordinate) -> bool {
        if self.mission == Mission::Deploy && !self.return_flight {
            self.destination == *coordinate
        } else {
            self.origin == *coordinate
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    pub total: u32,
    pub in_use: u32,
    pub expedition_total: u32,
    pub expedition_in_use: u32,
}

impl Slots {
    pub fn free(&self) -> u32 {
        self.total.saturating_sub(self.in_use)
    }

    pub fn expedition_free(&self) -> u32 {
        self.expedition_total.saturating_sub(self.expedition_in_use)
    }
}

/// A candidate, unsent movement. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetHypothesis {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub ships: Ships,
    pub mission: Mission,
    pub speed: Speed,
    pub duration_secs: u64,
    pub fuel: u64,
}

// ---------------------------------------------------------------------------
// Scans, reports and hostile activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub name: String,
    pub rank: u32,
    pub inactive: bool,
    pub vacation: bool,
    /// Newbie or strong-player protection.
    pub protected: bool,
    pub administrator: bool,
}

impl Occupant {
    pub fn is_farmable(&self) -> bool {
        self.inactive && !self.vacation && !self.protected && !self.administrator
    }
}

/// One position in a galaxy scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxySlot {
    pub coordinate: Coordinate,
    pub occupant: Option<Occupant>,
    #[serde(default)]
    pub has_moon: bool,
    #[serde(default)]
    pub debris: Option<Resources>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspionageReport {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub resources: Resources,
    /// Share of resources an attacker can carry away (0.5 for most targets).
    pub loot_ratio: f64,
    /// `None` when the probes could not see the fleet.
    pub fleet: Option<Ships>,
    /// `None` when the probes could not see the defences.
    pub defence_units: Option<u64>,
    pub inactive: bool,
}

impl EspionageReport {
    pub fn is_complete(&self) -> bool {
        self.fleet.is_some() && self.defence_units.is_some()
    }

    pub fn is_defenceless(&self) -> bool {
        self.fleet.as_ref().is_some_and(Ships::is_empty) && self.defence_units == Some(0)
    }

    pub fn loot(&self) -> Resources {
        self.resources.scale(self.loot_ratio)
    }
}

/// An incoming foreign fleet seen on the event list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileEvent {
    pub id: EventId,
    pub mission: Mission,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub arrival_time: DateTime<Utc>,
    /// Known when espionage tech reveals the composition.
    pub ships: Option<Ships>,
}

impl HostileEvent {
    pub fn is_probe_only(&self) -> bool {
        self.ships.as_ref().is_some_and(|ships| {
            ships.get(ShipType::EspionageProbe) > 0
                && ships.total() == ships.get(ShipType::EspionageProbe)
        })
    }
}
