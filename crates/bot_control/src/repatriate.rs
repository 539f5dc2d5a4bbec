//! AutoRepatriate: move surplus resources from colonies to one target.

use bot_core::{
    Celestial, CelestialId, Coordinate, FlightContext, GameRules, Leg, Mission, Resources,
    ShipType, Ships, Speed,
};
use serde::{Deserialize, Serialize};

use crate::ships_for;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepatriateSettings {
    /// Receiving celestial; the lowest-id planet when unset.
    pub target: Option<CelestialId>,
    /// Minimum total resources that make a trip worthwhile.
    pub min_total: u64,
    pub ship: ShipType,
    pub include_moons: bool,
}

impl Default for RepatriateSettings {
    fn default() -> Self {
        Self {
            target: None,
            min_total: 100_000,
            ship: ShipType::LargeCargo,
            include_moons: true,
        }
    }
}

/// One transport leg with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub origin: CelestialId,
    pub from: Coordinate,
    pub to: Coordinate,
    pub ships: Ships,
    pub payload: Resources,
    pub fuel: u64,
}

fn target_of<'a>(celestials: &'a [Celestial], settings: &RepatriateSettings) -> Option<&'a Celestial> {
    match settings.target {
        Some(id) => celestials.iter().find(|c| c.id == id),
        None => celestials.iter().filter(|c| !c.is_moon()).min_by_key(|c| c.id),
    }
}

fn fuel_for(
    rules: &dyn GameRules,
    ctx: &FlightContext<'_>,
    from: &Coordinate,
    to: &Coordinate,
    ships: &Ships,
) -> u64 {
    rules.fuel_consumption(
        ctx,
        &Leg {
            from,
            to,
            ships,
            speed: Speed::FULL,
            mission: Mission::Transport,
        },
    )
}

/// One transfer per eligible celestial. Payload is what remains after the
/// flight's own deuterium, trimmed to the hold space that fuel leaves.
pub fn plan_repatriation(
    rules: &dyn GameRules,
    ctx: &FlightContext<'_>,
    celestials: &[Celestial],
    settings: &RepatriateSettings,
) -> Vec<TransferPlan> {
    let Some(target) = target_of(celestials, settings) else {
        return Vec::new();
    };
    let per_ship = rules.cargo_capacity(&Ships::of(settings.ship, 1), ctx.researches, ctx.class);
    let mut plans = Vec::new();
    for origin in celestials {
        if origin.id == target.id || (origin.is_moon() && !settings.include_moons) {
            continue;
        }
        if origin.resources.total() < settings.min_total {
            continue;
        }
        let available = origin.ships.get(settings.ship);
        if available == 0 || per_ship == 0 {
            continue;
        }

        let all = Ships::of(settings.ship, available);
        let fuel = fuel_for(rules, ctx, &origin.coordinate, &target.coordinate, &all);
        let sendable = origin.resources.saturating_sub(&Resources::deuterium(fuel));
        let count = ships_for(sendable.total().saturating_add(fuel), per_ship).clamp(1, available);
        let ships = Ships::of(settings.ship, count);
        let fuel = fuel_for(rules, ctx, &origin.coordinate, &target.coordinate, &ships);
        if fuel > origin.resources.deuterium {
            continue;
        }
        // The flight's own deuterium rides in the hold too.
        let capacity = rules
            .cargo_capacity(&ships, ctx.researches, ctx.class)
            .saturating_sub(fuel);
        let payload = origin
            .resources
            .saturating_sub(&Resources::deuterium(fuel))
            .fit_into(capacity);
        if payload.total() < settings.min_total {
            continue;
        }
        plans.push(TransferPlan {
            origin: origin.id,
            from: origin.coordinate,
            to: target.coordinate,
            ships,
            payload,
            fuel,
        });
    }
    plans
}
