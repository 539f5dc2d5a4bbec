//! `try_send`: every feasibility check against the cache, then the provider.

use bot_core::feasibility::{check_fuel, check_sleep, check_slots, predict, validate_request};
use bot_core::{
    CelestialId, Coordinate, Feature, Fleet, FlightPrediction, Leg, Mission, Resources,
    SendRejection, Ships, Speed,
};
use tracing::{debug, info, warn};

use crate::provider::FleetOrder;
use crate::state::AgentContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub origin: CelestialId,
    pub destination: Coordinate,
    pub ships: Ships,
    pub mission: Mission,
    pub speed: Speed,
    pub payload: Resources,
}

impl SendRequest {
    pub fn new(origin: CelestialId, destination: Coordinate, ships: Ships, mission: Mission) -> Self {
        Self {
            origin,
            destination,
            ships,
            mission,
            speed: Speed::FULL,
            payload: Resources::default(),
        }
    }

    #[must_use]
    pub fn with_speed(self, speed: Speed) -> Self {
        Self { speed, ..self }
    }

    #[must_use]
    pub fn with_payload(self, payload: Resources) -> Self {
        Self { payload, ..self }
    }
}

/// A request that passed every check and is ready for the provider.
struct Cleared {
    order: FleetOrder,
    prediction: FlightPrediction,
}

/// Pure half of `try_send`, run under the state lock.
fn clear(ctx: &AgentContext, request: &SendRequest, force: bool) -> Result<Cleared, SendRejection> {
    let settings = ctx.settings();
    let now = ctx.now();
    let state = ctx.state.lock();
    let Some(origin) = state.celestial(request.origin) else {
        warn!(celestial = %request.origin, "send from unknown celestial");
        return Err(SendRejection::GenericError);
    };
    let flight = state.flight();
    let ships = request.ships.movable();
    let destination = validate_request(
        &origin.coordinate,
        &request.destination,
        &ships,
        request.mission,
        request.speed,
        &flight,
    )?;

    let leg = Leg {
        from: &origin.coordinate,
        to: &destination,
        ships: &ships,
        speed: request.speed,
        mission: request.mission,
    };
    let prediction = predict(ctx.rules.as_ref(), &flight, &leg);
    let available = origin
        .resources
        .deuterium
        .saturating_sub(request.payload.deuterium);
    let capacity = ctx.rules.fuel_capacity(&ships, &state.researches, state.class);
    check_fuel(&prediction, available, capacity)?;

    if !force && settings.features.is_active(Feature::SleepMode) {
        // A broken window is reported by the sleep job; here it just means no window.
        let window = settings.sleep_window().ok().flatten();
        check_sleep(now, &prediction, window.as_ref())?;
    }
    check_slots(&state.slots, settings.dispatch.slot_reserve, request.mission)?;

    Ok(Cleared {
        order: FleetOrder {
            origin: request.origin,
            destination,
            ships,
            mission: request.mission,
            speed: request.speed,
            payload: request.payload,
        },
        prediction,
    })
}

/// Validate, price and dispatch one fleet. Rejections are decided from the
/// cache; the provider is only called once every check passed. On success
/// the cache reflects the send before this returns, so the next call in the
/// same tick sees one slot fewer.
pub async fn try_send(
    ctx: &AgentContext,
    request: SendRequest,
    force: bool,
) -> Result<Fleet, SendRejection> {
    let cleared = match clear(ctx, &request, force) {
        Ok(cleared) => cleared,
        Err(rejection) => {
            debug!(
                origin = %request.origin,
                destination = %request.destination,
                mission = ?request.mission,
                "send rejected: {rejection}"
            );
            return Err(rejection);
        }
    };

    let fleet = match ctx.provider.send_fleet(cleared.order.clone()).await {
        Ok(fleet) => fleet,
        Err(e) => {
            warn!(
                origin = %request.origin,
                destination = %cleared.order.destination,
                "dispatch failed: {e}"
            );
            return Err(SendRejection::GenericError);
        }
    };

    {
        let mut state = ctx.state.lock();
        state.fleets.push(fleet.clone());
        state.slots.in_use += 1;
        if fleet.mission == Mission::Expedition {
            state.slots.expedition_in_use += 1;
        }
        if let Some(origin) = state.celestial_mut(request.origin) {
            origin.ships = origin.ships.saturating_sub(&cleared.order.ships);
            let spent = cleared
                .order
                .payload
                .add(&Resources::deuterium(cleared.prediction.fuel));
            origin.resources = origin.resources.saturating_sub(&spent);
        }
    }
    info!(
        fleet = %fleet.id,
        mission = ?fleet.mission,
        from = %fleet.origin,
        to = %fleet.destination,
        fuel = cleared.prediction.fuel,
        back_in_secs = cleared.prediction.total_secs,
        "fleet sent"
    );
    Ok(fleet)
}
