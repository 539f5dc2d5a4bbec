//! AutoCargo: keep enough cargo hulls on a celestial to lift its stock.

use bot_core::{Celestial, GameRules, PlayerClass, Researches, Resources, ShipType, Ships};
use serde::{Deserialize, Serialize};

use crate::{ships_for, Plan};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoSettings {
    pub ship: ShipType,
    /// Upper bound on hulls of `ship` kept on one celestial.
    pub max_ships: u64,
    /// Build on moons too.
    pub include_moons: bool,
}

impl Default for CargoSettings {
    fn default() -> Self {
        Self {
            ship: ShipType::LargeCargo,
            max_ships: 500,
            include_moons: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipOrder {
    pub ship: ShipType,
    pub count: u64,
}

fn affordable(stock: &Resources, cost: &Resources) -> u64 {
    [
        (stock.metal, cost.metal),
        (stock.crystal, cost.crystal),
        (stock.deuterium, cost.deuterium),
    ]
    .into_iter()
    .filter(|(_, c)| *c > 0)
    .map(|(s, c)| s / c)
    .min()
    .unwrap_or(0)
}

pub fn plan_cargo(
    rules: &dyn GameRules,
    researches: &Researches,
    class: PlayerClass,
    celestial: &Celestial,
    settings: &CargoSettings,
) -> Plan<ShipOrder> {
    if celestial.is_moon() && !settings.include_moons {
        return Plan::Idle;
    }
    if let Some(remaining) = celestial.production_countdown() {
        return Plan::Wait(remaining);
    }
    if celestial.facilities.shipyard == 0 {
        return Plan::Idle;
    }

    let stock = celestial.resources.total();
    let capacity = rules.cargo_capacity(&celestial.ships, researches, class);
    if capacity >= stock {
        return Plan::Idle;
    }
    let per_ship = rules.cargo_capacity(&Ships::of(settings.ship, 1), researches, class);
    let missing = ships_for(stock - capacity, per_ship);
    let room = settings
        .max_ships
        .saturating_sub(celestial.ships.get(settings.ship));
    let wanted = missing.min(room);
    if wanted == 0 {
        return Plan::Idle;
    }

    let cost = rules.ship_cost(settings.ship);
    let count = wanted.min(affordable(&celestial.resources, &cost));
    if count > 0 {
        return Plan::Act(ShipOrder {
            ship: settings.ship,
            count,
        });
    }
    match celestial.production.seconds_until(&celestial.resources, &cost) {
        Some(secs) => Plan::Wait(secs.max(1)),
        None => Plan::Idle,
    }
}
