//! Harvest: collect debris fields sitting at own positions.

use bot_core::{
    Celestial, CelestialId, CelestialType, Coordinate, GalaxySlot, GameRules, PlayerClass,
    Researches, ShipType, Ships,
};
use serde::{Deserialize, Serialize};

use crate::ships_for;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// Smallest field, in total resources, worth a trip.
    pub min_debris: u64,
    pub ship: ShipType,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            min_debris: 20_000,
            ship: ShipType::Recycler,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestPlan {
    pub origin: CelestialId,
    pub from: Coordinate,
    pub field: Coordinate,
    pub ships: Ships,
}

/// Pair each large enough field with the own body at the same slot that
/// has harvesters on hand. Ships are not reused across fields.
pub fn plan_harvests(
    rules: &dyn GameRules,
    researches: &Researches,
    class: PlayerClass,
    celestials: &[Celestial],
    scanned: &[GalaxySlot],
    settings: &HarvestSettings,
) -> Vec<HarvestPlan> {
    let per_ship = rules.cargo_capacity(&Ships::of(settings.ship, 1), researches, class);
    if per_ship == 0 {
        return Vec::new();
    }
    let mut used: Vec<(CelestialId, u64)> = Vec::new();
    let mut plans = Vec::new();
    for slot in scanned {
        let Some(debris) = slot.debris else {
            continue;
        };
        if debris.total() < settings.min_debris {
            continue;
        }
        let origin = celestials
            .iter()
            .filter(|c| c.coordinate.same_slot(&slot.coordinate))
            .map(|c| {
                let spent = used.iter().find(|(id, _)| *id == c.id).map_or(0, |(_, n)| *n);
                (c, c.ships.get(settings.ship).saturating_sub(spent))
            })
            .filter(|(_, free)| *free > 0)
            .max_by_key(|(_, free)| *free);
        let Some((origin, free)) = origin else {
            continue;
        };
        let count = ships_for(debris.total(), per_ship).min(free);
        match used.iter_mut().find(|(id, _)| *id == origin.id) {
            Some((_, n)) => *n += count,
            None => used.push((origin.id, count)),
        }
        plans.push(HarvestPlan {
            origin: origin.id,
            from: origin.coordinate,
            field: slot.coordinate.with_kind(CelestialType::Debris),
            ships: Ships::of(settings.ship, count),
        });
    }
    plans
}
