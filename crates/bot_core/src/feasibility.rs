//! Validation and pricing of a prospective fleet movement.
//!
//! Everything here is pure: the daemon's dispatcher runs these checks against
//! its cached state and only then talks to the provider.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::{FlightContext, GameRules, Leg};
use crate::ships::Ships;
use crate::sleep::SleepWindow;
use crate::types::{
    Coordinate, FleetHypothesis, Mission, Slots, Speed, UniverseInfo, EXPEDITION_POSITION,
    MAX_PLANET_POSITION,
};

/// Why a send was refused. These are control-flow signals, not failures:
/// callers branch on the variant to retry, switch mission or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SendRejection {
    #[error("no movable ships in the fleet")]
    NoMovableShips,
    #[error("expeditions need at least one ship that is not a probe")]
    ProbesOnlyExpedition,
    #[error("destination is the origin")]
    SameAsOrigin,
    #[error("destination is outside the universe")]
    InvalidDestination,
    #[error("speed not available for this class")]
    InvalidSpeed,
    #[error("not enough deuterium for the flight")]
    NotEnoughFuel,
    #[error("fuel does not fit in the fleet's tanks")]
    FuelCapacityExceeded,
    #[error("fleet would return during sleep time")]
    AfterSleepTime,
    #[error("no free fleet slot above the reserve")]
    NotEnoughSlots,
    #[error("provider refused or failed the dispatch")]
    GenericError,
}

/// Predicted cost and timing of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightPrediction {
    pub one_way_secs: u64,
    pub fuel: u64,
    /// Until the ships are home again (expeditions include the hold).
    pub total_secs: u64,
}

/// Resolve a destination into range. Ring universes wrap galaxy and system;
/// otherwise anything outside the grid is rejected.
pub fn normalize_destination(
    destination: &Coordinate,
    universe: &UniverseInfo,
) -> Result<Coordinate, SendRejection> {
    let wrap = |value: u32, size: u32| -> u32 {
        let zero_based = i64::from(value) - 1;
        u32::try_from(zero_based.rem_euclid(i64::from(size))).unwrap_or(0) + 1
    };
    let in_range = |value: u32, size: u32| value >= 1 && value <= size;

    let mut resolved = *destination;
    if universe.donut_galaxy && universe.galaxies > 0 {
        resolved.galaxy = wrap(destination.galaxy, universe.galaxies);
    } else if !in_range(destination.galaxy, universe.galaxies) {
        return Err(SendRejection::InvalidDestination);
    }
    if universe.donut_system && universe.systems > 0 {
        resolved.system = wrap(destination.system, universe.systems);
    } else if !in_range(destination.system, universe.systems) {
        return Err(SendRejection::InvalidDestination);
    }
    if !in_range(destination.position, EXPEDITION_POSITION) {
        return Err(SendRejection::InvalidDestination);
    }
    Ok(resolved)
}

/// Input checks that need no prediction.
pub fn validate_request(
    origin: &Coordinate,
    destination: &Coordinate,
    ships: &Ships,
    mission: Mission,
    speed: Speed,
    ctx: &FlightContext<'_>,
) -> Result<Coordinate, SendRejection> {
    if !ships.has_movable_fleet() {
        return Err(SendRejection::NoMovableShips);
    }
    if mission == Mission::Expedition && !ships.has_non_probe() {
        return Err(SendRejection::ProbesOnlyExpedition);
    }
    let destination = normalize_destination(destination, ctx.universe)?;
    if destination == *origin {
        return Err(SendRejection::SameAsOrigin);
    }
    let deep_space = destination.position == EXPEDITION_POSITION;
    if deep_space != (mission == Mission::Expedition) {
        return Err(SendRejection::InvalidDestination);
    }
    if !deep_space && destination.position > MAX_PLANET_POSITION {
        return Err(SendRejection::InvalidDestination);
    }
    if !speed.is_allowed_for(ctx.class) {
        return Err(SendRejection::InvalidSpeed);
    }
    Ok(destination)
}

pub fn predict(rules: &dyn GameRules, ctx: &FlightContext<'_>, leg: &Leg<'_>) -> FlightPrediction {
    let one_way_secs = rules.flight_time(ctx, leg);
    let fuel = rules.fuel_consumption(ctx, leg);
    let round_trip = one_way_secs.saturating_mul(2);
    let total_secs = if leg.mission == Mission::Expedition {
        round_trip.saturating_add(rules.expedition_hold_secs())
    } else {
        round_trip
    };
    FlightPrediction {
        one_way_secs,
        fuel,
        total_secs,
    }
}

/// Fuel must come out of the origin's stock and fit in the fleet's tanks.
pub fn check_fuel(
    prediction: &FlightPrediction,
    available_deuterium: u64,
    fuel_capacity: u64,
) -> Result<(), SendRejection> {
    if prediction.fuel > available_deuterium {
        return Err(SendRejection::NotEnoughFuel);
    }
    if prediction.fuel > fuel_capacity {
        return Err(SendRejection::FuelCapacityExceeded);
    }
    Ok(())
}

/// Rejects when the fleet would be back while the account sleeps.
pub fn check_sleep(
    now: DateTime<Utc>,
    prediction: &FlightPrediction,
    window: Option<&SleepWindow>,
) -> Result<(), SendRejection> {
    let Some(window) = window else {
        return Ok(());
    };
    // A return beyond chrono's range never lands in any window.
    let back = i64::try_from(prediction.total_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|trip| now.checked_add_signed(trip));
    if back.is_some_and(|back| window.lands_inside(now, back)) {
        Err(SendRejection::AfterSleepTime)
    } else {
        Ok(())
    }
}

/// A slot must remain free above the configured reserve.
pub fn check_slots(slots: &Slots, reserve: u32, mission: Mission) -> Result<(), SendRejection> {
    if slots.free() <= reserve {
        return Err(SendRejection::NotEnoughSlots);
    }
    if mission == Mission::Expedition && slots.expedition_free() == 0 {
        return Err(SendRejection::NotEnoughSlots);
    }
    Ok(())
}

/// Build a hypothesis for one origin/destination/speed triple, or `None` when
/// the static checks or the fuel budget rule it out.
pub fn hypothesis(
    rules: &dyn GameRules,
    ctx: &FlightContext<'_>,
    origin: &Coordinate,
    destination: &Coordinate,
    ships: &Ships,
    mission: Mission,
    speed: Speed,
    available_deuterium: u64,
) -> Option<FleetHypothesis> {
    let destination = validate_request(origin, destination, ships, mission, speed, ctx).ok()?;
    let leg = Leg {
        from: origin,
        to: &destination,
        ships,
        speed,
        mission,
    };
    let prediction = predict(rules, ctx, &leg);
    let capacity = rules.fuel_capacity(ships, ctx.researches, ctx.class);
    check_fuel(&prediction, available_deuterium, capacity).ok()?;
    Some(FleetHypothesis {
        origin: *origin,
        destination,
        ships: *ships,
        mission,
        speed,
        duration_secs: prediction.one_way_secs,
        fuel: prediction.fuel,
    })
}
