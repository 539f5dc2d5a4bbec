//! Expeditions: one fleet per free expedition slot.

use bot_core::{
    Celestial, CelestialId, Coordinate, GameRules, PlayerClass, Researches, ShipType, Ships,
    Slots, EXPEDITION_POSITION,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpeditionSettings {
    /// Launch celestial; the one with the most cargo capacity when unset.
    pub origin: Option<CelestialId>,
    /// Composition of every expedition fleet.
    pub fleet: Ships,
    /// Systems away from the origin; 0 explores the origin's own system.
    pub system_offset: i32,
}

impl Default for ExpeditionSettings {
    fn default() -> Self {
        let mut fleet = Ships::of(ShipType::LargeCargo, 20);
        fleet.set(ShipType::EspionageProbe, 1);
        fleet.set(ShipType::Pathfinder, 1);
        Self {
            origin: None,
            fleet,
            system_offset: 0,
        }
    }
}

pub fn expedition_origin<'a>(
    rules: &dyn GameRules,
    researches: &Researches,
    class: PlayerClass,
    celestials: &'a [Celestial],
    configured: Option<CelestialId>,
) -> Option<&'a Celestial> {
    if let Some(id) = configured {
        return celestials.iter().find(|c| c.id == id);
    }
    celestials
        .iter()
        .max_by_key(|c| (rules.cargo_capacity(&c.ships, researches, class), std::cmp::Reverse(c.id)))
}

/// Deep-space slot the fleets head for.
pub fn expedition_target(origin: &Coordinate, settings: &ExpeditionSettings) -> Coordinate {
    let system = i64::from(origin.system) + i64::from(settings.system_offset);
    Coordinate::planet(
        origin.galaxy,
        u32::try_from(system.max(1)).unwrap_or(origin.system),
        EXPEDITION_POSITION,
    )
}

/// Fleets to launch now, bounded by free slots and ships on hand.
pub fn plan_expeditions(origin: &Celestial, slots: &Slots, settings: &ExpeditionSettings) -> Vec<Ships> {
    let free = slots.expedition_free().min(slots.free());
    let mut stock = origin.ships;
    let mut fleets = Vec::new();
    if !settings.fleet.has_non_probe() {
        return fleets;
    }
    for _ in 0..free {
        if !stock.has_at_least(&settings.fleet) {
            break;
        }
        stock = stock.saturating_sub(&settings.fleet);
        fleets.push(settings.fleet);
    }
    fleets
}
