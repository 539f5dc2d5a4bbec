//! Ship types and ship-count vectors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipType {
    LightFighter,
    HeavyFighter,
    Cruiser,
    Battleship,
    Battlecruiser,
    Bomber,
    Destroyer,
    Deathstar,
    SmallCargo,
    LargeCargo,
    ColonyShip,
    Recycler,
    EspionageProbe,
    SolarSatellite,
    Crawler,
    Reaper,
    Pathfinder,
}

impl ShipType {
    pub const ALL: [ShipType; 17] = [
        ShipType::LightFighter,
        ShipType::HeavyFighter,
        ShipType::Cruiser,
        ShipType::Battleship,
        ShipType::Battlecruiser,
        ShipType::Bomber,
        ShipType::Destroyer,
        ShipType::Deathstar,
        ShipType::SmallCargo,
        ShipType::LargeCargo,
        ShipType::ColonyShip,
        ShipType::Recycler,
        ShipType::EspionageProbe,
        ShipType::SolarSatellite,
        ShipType::Crawler,
        ShipType::Reaper,
        ShipType::Pathfinder,
    ];

    /// Satellites and crawlers have no drive.
    pub fn is_movable(self) -> bool {
        !matches!(self, ShipType::SolarSatellite | ShipType::Crawler)
    }

    pub fn is_cargo(self) -> bool {
        matches!(self, ShipType::SmallCargo | ShipType::LargeCargo)
    }

    pub fn is_combat(self) -> bool {
        matches!(
            self,
            ShipType::LightFighter
                | ShipType::HeavyFighter
                | ShipType::Cruiser
                | ShipType::Battleship
                | ShipType::Battlecruiser
                | ShipType::Bomber
                | ShipType::Destroyer
                | ShipType::Deathstar
                | ShipType::Reaper
        )
    }
}

/// Count of each ship type on a celestial or in a fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ships {
    pub light_fighter: u64,
    pub heavy_fighter: u64,
    pub cruiser: u64,
    pub battleship: u64,
    pub battlecruiser: u64,
    pub bomber: u64,
    pub destroyer: u64,
    pub deathstar: u64,
    pub small_cargo: u64,
    pub large_cargo: u64,
    pub colony_ship: u64,
    pub recycler: u64,
    pub espionage_probe: u64,
    pub solar_satellite: u64,
    pub crawler: u64,
    pub reaper: u64,
    pub pathfinder: u64,
}

impl Ships {
    pub fn of(ship: ShipType, count: u64) -> Self {
        let mut ships = Ships::default();
        ships.set(ship, count);
        ships
    }

    fn slot_mut(&mut self, ship: ShipType) -> &mut u64 {
        match ship {
            ShipType::LightFighter => &mut self.light_fighter,
            ShipType::HeavyFighter => &mut self.heavy_fighter,
            ShipType::Cruiser => &mut self.cruiser,
            ShipType::Battleship => &mut self.battleship,
            ShipType::Battlecruiser => &mut self.battlecruiser,
            ShipType::Bomber => &mut self.bomber,
            ShipType::Destroyer => &mut self.destroyer,
            ShipType::Deathstar => &mut self.deathstar,
            ShipType::SmallCargo => &mut self.small_cargo,
            ShipType::LargeCargo => &mut self.large_cargo,
            ShipType::ColonyShip => &mut self.colony_ship,
            ShipType::Recycler => &mut self.recycler,
            ShipType::EspionageProbe => &mut self.espionage_probe,
            ShipType::SolarSatellite => &mut self.solar_satellite,
            ShipType::Crawler => &mut self.crawler,
            ShipType::Reaper => &mut self.reaper,
            ShipType::Pathfinder => &mut self.pathfinder,
        }
    }

    pub fn get(&self, ship: ShipType) -> u64 {
        match ship {
            ShipType::LightFighter => self.light_fighter,
            ShipType::HeavyFighter => self.heavy_fighter,
            ShipType::Cruiser => self.cruiser,
            ShipType::Battleship => self.battleship,
            ShipType::Battlecruiser => self.battlecruiser,
            ShipType::Bomber => self.bomber,
            ShipType::Destroyer => self.destroyer,
            ShipType::Deathstar => self.deathstar,
            ShipType::SmallCargo => self.small_cargo,
            ShipType::LargeCargo => self.large_cargo,
            ShipType::ColonyShip => self.colony_ship,
            ShipType::Recycler => self.recycler,
            ShipType::EspionageProbe => self.espionage_probe,
            ShipType::SolarSatellite => self.solar_satellite,
            ShipType::Crawler => self.crawler,
            ShipType::Reaper => self.reaper,
            ShipType::Pathfinder => self.pathfinder,
        }
    }

    pub fn set(&mut self, ship: ShipType, count: u64) {
        *self.slot_mut(ship) = count;
    }

    /// Non-zero entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ShipType, u64)> + '_ {
        ShipType::ALL
            .into_iter()
            .map(|ship| (ship, self.get(ship)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_movable_fleet(&self) -> bool {
        self.iter().any(|(ship, _)| ship.is_movable())
    }

    /// Fresh copy holding only ships with a drive.
    #[must_use]
    pub fn movable(&self) -> Ships {
        let mut out = *self;
        out.set(ShipType::SolarSatellite, 0);
        out.set(ShipType::Crawler, 0);
        out
    }

    #[must_use]
    pub fn add(&self, other: &Ships) -> Ships {
        let mut out = *self;
        for (ship, count) in other.iter() {
            *out.slot_mut(ship) += count;
        }
        out
    }

    /// Per-type difference, clamped at zero.
    #[must_use]
    pub fn saturating_sub(&self, other: &Ships) -> Ships {
        let mut out = *self;
        for (ship, count) in other.iter() {
            let slot = out.slot_mut(ship);
            *slot = slot.saturating_sub(count);
        }
        out
    }

    #[must_use]
    pub fn scale(&self, factor: f64) -> Ships {
        let mut out = Ships::default();
        for (ship, count) in self.iter() {
            out.set(ship, (count as f64 * factor).floor() as u64);
        }
        out
    }

    /// True when every type in `required` is present in at least that count.
    pub fn has_at_least(&self, required: &Ships) -> bool {
        required
            .iter()
            .all(|(ship, count)| self.get(ship) >= count)
    }

    /// True when any ship besides espionage probes is present.
    pub fn has_non_probe(&self) -> bool {
        self.iter()
            .any(|(ship, _)| ship.is_movable() && ship != ShipType::EspionageProbe)
    }
}
