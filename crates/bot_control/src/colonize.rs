//! Colonize: claim configured slots while the planet cap allows.

use bot_core::{Celestial, Coordinate, GameRules, Researches, ShipType, UniverseInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonizeSettings {
    /// Wanted planet slots, in priority order.
    pub targets: Vec<Coordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColonizePlan {
    pub from: Coordinate,
    pub to: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonizeSkip {
    PlanetCap,
    NoTargetLeft,
    NoColonyShip,
}

/// First free target and the nearest planet holding a colony ship.
/// `occupied` lists slots a scan found taken by someone else.
pub fn plan_colonization(
    rules: &dyn GameRules,
    universe: &UniverseInfo,
    researches: &Researches,
    celestials: &[Celestial],
    occupied: &[Coordinate],
    settings: &ColonizeSettings,
) -> Result<ColonizePlan, ColonizeSkip> {
    let planets = celestials.iter().filter(|c| !c.is_moon()).count();
    if planets >= researches.max_planets() as usize {
        return Err(ColonizeSkip::PlanetCap);
    }
    let taken = |t: &Coordinate| {
        celestials.iter().any(|c| c.coordinate.same_slot(t))
            || occupied.iter().any(|o| o.same_slot(t))
    };
    let Some(target) = settings.targets.iter().copied().find(|t| !taken(t)) else {
        return Err(ColonizeSkip::NoTargetLeft);
    };
    celestials
        .iter()
        .filter(|c| c.ships.get(ShipType::ColonyShip) > 0)
        .min_by_key(|c| rules.distance(&c.coordinate, &target, universe))
        .map(|origin| ColonizePlan {
            from: origin.coordinate,
            to: target,
        })
        .ok_or(ColonizeSkip::NoColonyShip)
}
