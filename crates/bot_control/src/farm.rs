//! AutoFarm planning over the farm table.

use bot_core::{
    Coordinate, ExchangeRatio, FarmTable, GalaxySlot, GameRules, PlayerClass, ReportPolicy,
    Researches, ShipType, Ships,
};
use serde::{Deserialize, Serialize};

use crate::ships_for;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmSettings {
    pub galaxy: u32,
    pub from_system: u32,
    pub to_system: u32,
    /// Probes in a first wave; each escalation triples it.
    pub base_probes: u64,
    /// Minimum loot, in metal units, worth a raid.
    pub min_loot: u64,
    pub attack_ship: ShipType,
    pub max_attacks_per_run: usize,
    /// Hours before a report is considered stale.
    pub report_retention_hours: i64,
    pub min_rank: u32,
    pub ratio: ExchangeRatio,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self {
            galaxy: 1,
            from_system: 1,
            to_system: 10,
            base_probes: 2,
            min_loot: 50_000,
            attack_ship: ShipType::SmallCargo,
            max_attacks_per_run: 5,
            report_retention_hours: 6,
            min_rank: 0,
            ratio: ExchangeRatio::default(),
        }
    }
}

impl FarmSettings {
    pub fn in_range(&self, coordinate: &Coordinate) -> bool {
        coordinate.galaxy == self.galaxy
            && coordinate.system >= self.from_system
            && coordinate.system <= self.to_system
    }

    pub fn report_policy(&self) -> ReportPolicy {
        ReportPolicy {
            min_loot: self.min_loot,
            ratio: self.ratio,
        }
    }

    /// Keep inactive, unprotected occupants whose rank number is at least `min_rank`.
    pub fn farmable(&self, slots: Vec<GalaxySlot>) -> Vec<GalaxySlot> {
        slots
            .into_iter()
            .filter(|s| {
                s.occupant
                    .as_ref()
                    .is_some_and(|o| o.is_farmable() && o.rank >= self.min_rank)
            })
            .collect()
    }
}

/// Probe waves that fit the probes on hand, in table order.
pub fn plan_probe_waves(table: &FarmTable, available: u64, base: u64) -> Vec<(Coordinate, u64)> {
    let mut left = available;
    let mut waves = Vec::new();
    for (coordinate, needed) in table.probe_queue(base) {
        if needed > left {
            continue;
        }
        left -= needed;
        waves.push((coordinate, needed));
    }
    waves
}

/// Raids for attack-ready targets, richest first, each with enough hulls
/// for its loot while the origin's stock lasts.
pub fn plan_attacks(
    rules: &dyn GameRules,
    researches: &Researches,
    class: PlayerClass,
    table: &FarmTable,
    available: &Ships,
    settings: &FarmSettings,
) -> Vec<(Coordinate, Ships)> {
    let per_ship = rules.cargo_capacity(&Ships::of(settings.attack_ship, 1), researches, class);
    let mut left = available.get(settings.attack_ship);
    let mut raids = Vec::new();
    for (coordinate, loot) in table.attack_queue(&settings.ratio) {
        if raids.len() >= settings.max_attacks_per_run {
            break;
        }
        let needed = ships_for(loot.total(), per_ship).max(1);
        if needed > left {
            continue;
        }
        left -= needed;
        raids.push((coordinate, Ships::of(settings.attack_ship, needed)));
    }
    raids
}
