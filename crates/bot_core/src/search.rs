//! Destination search: enumerate where a fleet could go for a mission and
//! price every (destination, speed) pair.

use crate::feasibility::{hypothesis, normalize_destination};
use crate::rules::{FlightContext, GameRules};
use crate::ships::{ShipType, Ships};
use crate::types::{
    Celestial, CelestialType, Coordinate, FleetHypothesis, Mission, Speed, EXPEDITION_POSITION,
    MAX_PLANET_POSITION,
};

pub struct SearchContext<'a> {
    pub rules: &'a dyn GameRules,
    pub flight: FlightContext<'a>,
    /// Every celestial the account owns.
    pub own: &'a [Celestial],
    /// How many systems either side of the origin to consider.
    pub system_radius: u32,
}

/// Whether the ship vector can fly `mission` at all.
pub fn mission_supported(ships: &Ships, mission: Mission) -> bool {
    match mission {
        Mission::Harvest => {
            ships.get(ShipType::Recycler) > 0 || ships.get(ShipType::Pathfinder) > 0
        }
        Mission::Spy => ships.get(ShipType::EspionageProbe) > 0,
        Mission::Colonize => ships.get(ShipType::ColonyShip) > 0,
        Mission::Expedition => ships.has_non_probe(),
        Mission::Attack | Mission::Transport | Mission::Deploy => ships.has_movable_fleet(),
    }
}

fn nearby_systems(ctx: &SearchContext<'_>, origin: &Coordinate) -> Vec<u32> {
    let radius = i64::from(ctx.system_radius);
    let mut systems = Vec::new();
    for delta in -radius..=radius {
        let raw = i64::from(origin.system) + delta;
        let Ok(raw) = u32::try_from(raw) else {
            continue;
        };
        let probe = Coordinate::planet(origin.galaxy, raw, 1);
        if let Ok(resolved) = normalize_destination(&probe, ctx.flight.universe) {
            if !systems.contains(&resolved.system) {
                systems.push(resolved.system);
            }
        }
    }
    systems
}

fn is_own(ctx: &SearchContext<'_>, coordinate: &Coordinate) -> bool {
    ctx.own.iter().any(|c| c.coordinate.same_slot(coordinate))
}

/// The planet of a moon, or the moon of a planet, when the account owns it.
pub fn switch_destination(origin: &Celestial, own: &[Celestial]) -> Option<Coordinate> {
    let wanted = match origin.coordinate.kind {
        CelestialType::Planet => CelestialType::Moon,
        CelestialType::Moon => CelestialType::Planet,
        CelestialType::Debris => return None,
    };
    own.iter()
        .map(|c| c.coordinate)
        .find(|c| c.same_slot(&origin.coordinate) && c.kind == wanted)
}

/// Candidate destinations for `mission` from `origin`.
pub fn destinations(
    ctx: &SearchContext<'_>,
    origin: &Celestial,
    mission: Mission,
) -> Vec<Coordinate> {
    let at = origin.coordinate;
    match mission {
        Mission::Deploy | Mission::Transport => ctx
            .own
            .iter()
            .map(|c| c.coordinate)
            .filter(|c| *c != at)
            .collect(),
        Mission::Harvest => nearby_systems(ctx, &at)
            .into_iter()
            .flat_map(|s| (1..=MAX_PLANET_POSITION).map(move |p| Coordinate::debris(at.galaxy, s, p)))
            .collect(),
        Mission::Spy | Mission::Colonize => nearby_systems(ctx, &at)
            .into_iter()
            .flat_map(|s| (1..=MAX_PLANET_POSITION).map(move |p| Coordinate::planet(at.galaxy, s, p)))
            .filter(|c| !is_own(ctx, c))
            .collect(),
        Mission::Expedition => nearby_systems(ctx, &at)
            .into_iter()
            .map(|s| Coordinate::planet(at.galaxy, s, EXPEDITION_POSITION))
            .collect(),
        Mission::Attack => Vec::new(),
    }
}

/// Price every destination at every speed the class allows. Pairs that fail
/// the static checks or the origin's fuel budget are dropped.
pub fn search(
    ctx: &SearchContext<'_>,
    origin: &Celestial,
    ships: &Ships,
    mission: Mission,
    destinations: &[Coordinate],
) -> Vec<FleetHypothesis> {
    if !mission_supported(ships, mission) {
        return Vec::new();
    }
    let deuterium = origin.resources.deuterium;
    let mut out = Vec::new();
    for speed in Speed::allowed_for(ctx.flight.class) {
        for destination in destinations {
            if let Some(h) = hypothesis(
                ctx.rules,
                &ctx.flight,
                &origin.coordinate,
                destination,
                ships,
                mission,
                speed,
                deuterium,
            ) {
                out.push(h);
            }
        }
    }
    out
}

/// Fleet-save ordering: ascending fuel, then whether the one-way duration
/// already meets `min_duration_secs`. Candidates that meet the minimum are
/// tried before the rest; among those that do not, longer flights win.
pub fn rank_for_fleet_save(
    mut candidates: Vec<FleetHypothesis>,
    min_duration_secs: u64,
) -> Vec<FleetHypothesis> {
    candidates.sort_by(|a, b| {
        let meets = |h: &FleetHypothesis| h.duration_secs >= min_duration_secs;
        a.fuel
            .cmp(&b.fuel)
            .then(meets(b).cmp(&meets(a)))
            .then(a.destination.cmp(&b.destination))
    });
    let (mut meeting, mut short): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|h| h.duration_secs >= min_duration_secs);
    short.sort_by(|a, b| b.duration_secs.cmp(&a.duration_secs).then(a.fuel.cmp(&b.fuel)));
    meeting.append(&mut short);
    meeting
}
