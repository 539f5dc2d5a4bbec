//! Fleet-save: get every movable ship of a celestial into the air, away
//! from harm, for at least a minimum duration.

use std::time::Duration as StdDuration;

use bot_config::{FleetSaveSettings, ReturnWait};
use bot_core::search::{destinations, rank_for_fleet_save, search, switch_destination, SearchContext};
use bot_core::{
    Celestial, CelestialId, Coordinate, Fleet, FleetHypothesis, Mission, Resources, SendRejection,
    ShipType, Ships, Speed,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::dispatch::{try_send, SendRequest};
use crate::state::AgentContext;

/// Consecutive provider failures after which a mission is abandoned.
const MAX_GENERIC_FAILURES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub celestial: CelestialId,
    pub min_duration_secs: u64,
    /// Bypass the sleep-window check.
    pub force: bool,
    /// Stop waiting for returning fleets at this moment.
    pub deadline: Option<DateTime<Utc>>,
}

impl SaveRequest {
    pub fn new(celestial: CelestialId, min_duration_secs: u64) -> Self {
        Self {
            celestial,
            min_duration_secs,
            force: false,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("celestial {0} is unknown")]
    UnknownCelestial(CelestialId),
    #[error("no movable ships to save")]
    NothingToSave,
    #[error("no fleet slot available")]
    NoSlot,
    #[error("no mission found a destination")]
    NoDestination,
}

/// Missions tried in turn. Colonize only with a colony ship on board; the
/// search drops any mission the ships cannot fly.
pub fn mission_order(default: Mission, ships: &Ships) -> Vec<Mission> {
    let mut order = vec![default];
    if default != Mission::Deploy {
        order.push(Mission::Deploy);
    }
    if ships.get(ShipType::ColonyShip) > 0 && default != Mission::Colonize {
        order.push(Mission::Colonize);
    }
    if default != Mission::Spy {
        order.push(Mission::Spy);
    }
    order
}

fn in_scope(fleet: &Fleet, scope: ReturnWait, home: &Coordinate) -> bool {
    match scope {
        ReturnWait::None => false,
        ReturnWait::Celestial => fleet.returns_to(home),
        ReturnWait::Account => true,
    }
}

/// Poll until every fleet in scope is home, the wait cap is reached or the
/// deadline passes, whichever comes first.
async fn wait_for_returns(
    ctx: &AgentContext,
    home: &Coordinate,
    settings: &FleetSaveSettings,
    deadline: Option<DateTime<Utc>>,
) {
    if settings.wait_for_returns == ReturnWait::None {
        return;
    }
    let started = ctx.now();
    let mut limit = started + seconds(settings.max_wait_secs);
    if let Some(deadline) = deadline {
        limit = limit.min(deadline);
    }
    let poll = StdDuration::from_secs(settings.poll_secs.max(1));
    loop {
        let fleets = ctx.refresh_fleets().await;
        let now = ctx.now();
        let pending = fleets
            .iter()
            .filter(|f| in_scope(f, settings.wait_for_returns, home))
            .map(Fleet::home_time)
            .filter(|t| *t > now && *t <= limit)
            .max();
        let Some(last) = pending else {
            return;
        };
        let until_last = (last - now).to_std().unwrap_or_default() + StdDuration::from_secs(1);
        debug!(%home, until = %last, "waiting for returning fleets");
        tokio::time::sleep(until_last.min(poll)).await;
        if ctx.now() >= limit {
            return;
        }
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}

fn candidates(
    ctx: &AgentContext,
    origin: &Celestial,
    ships: &Ships,
    mission: Mission,
    settings: &FleetSaveSettings,
    min_duration_secs: u64,
) -> Vec<FleetHypothesis> {
    let state = ctx.state.lock();
    let search_ctx = SearchContext {
        rules: ctx.rules.as_ref(),
        flight: state.flight(),
        own: &state.celestials,
        system_radius: settings.system_radius,
    };
    let targets = destinations(&search_ctx, origin, mission);
    rank_for_fleet_save(
        search(&search_ctx, origin, ships, mission, &targets),
        min_duration_secs,
    )
}

/// What is loaded on top of the ships: everything that fits once the fuel
/// is aboard.
fn payload_for(ctx: &AgentContext, origin: &Celestial, ships: &Ships, fuel: u64) -> Resources {
    let state = ctx.state.lock();
    let cargo = ctx.rules.cargo_capacity(ships, &state.researches, state.class);
    let fuel = Resources::deuterium(fuel);
    origin
        .resources
        .saturating_sub(&fuel)
        .fit_into(cargo.saturating_sub(fuel.deuterium))
}

enum Attempt {
    Sent(Fleet, u64),
    NoSlot,
    Exhausted,
}

async fn try_candidates(
    ctx: &AgentContext,
    origin: &Celestial,
    ranked: Vec<FleetHypothesis>,
    force: bool,
) -> Attempt {
    let mut failures = 0;
    for candidate in ranked {
        let payload = payload_for(ctx, origin, &candidate.ships, candidate.fuel);
        let request = SendRequest::new(origin.id, candidate.destination, candidate.ships, candidate.mission)
            .with_speed(candidate.speed)
            .with_payload(payload);
        match try_send(ctx, request, force).await {
            Ok(fleet) => return Attempt::Sent(fleet, candidate.duration_secs),
            Err(SendRejection::NotEnoughSlots) => return Attempt::NoSlot,
            Err(SendRejection::GenericError) => {
                failures += 1;
                if failures >= MAX_GENERIC_FAILURES {
                    return Attempt::Exhausted;
                }
            }
            Err(_) => {}
        }
    }
    Attempt::Exhausted
}

/// Recall `fleet` after half its one-way flight so it is back at the
/// origin after the planned duration.
fn schedule_recall(ctx: &AgentContext, fleet: &Fleet, one_way_secs: u64) {
    let ctx = ctx.clone();
    let id = fleet.id;
    let after = StdDuration::from_secs(one_way_secs / 2);
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        match ctx.provider.recall_fleet(id).await {
            Ok(()) => {
                info!(fleet = %id, "fleet-save recalled");
                ctx.refresh_fleets().await;
            }
            Err(e) => warn!(fleet = %id, "recall failed: {e}"),
        }
    });
}

async fn save(ctx: &AgentContext, request: &SaveRequest) -> Result<Fleet, SaveError> {
    let settings = ctx.settings();
    let save_settings = &settings.fleet_save;
    let home = ctx
        .state
        .lock()
        .celestial(request.celestial)
        .map(|c| c.coordinate)
        .ok_or(SaveError::UnknownCelestial(request.celestial))?;

    wait_for_returns(ctx, &home, save_settings, request.deadline).await;
    ctx.refresh_slots().await;
    let origin = ctx
        .refresh_celestial(request.celestial)
        .await
        .ok_or(SaveError::UnknownCelestial(request.celestial))?;
    let ships = origin.ships.movable();
    if !ships.has_movable_fleet() {
        return Err(SaveError::NothingToSave);
    }

    let min = request.min_duration_secs.max(save_settings.min_duration_secs);
    for mission in mission_order(save_settings.default_mission, &ships) {
        let ranked = candidates(ctx, &origin, &ships, mission, save_settings, min);
        debug!(celestial = %origin.id, ?mission, candidates = ranked.len(), "fleet-save candidates");
        match try_candidates(ctx, &origin, ranked, request.force).await {
            Attempt::Sent(fleet, one_way) => {
                if save_settings.recall {
                    schedule_recall(ctx, &fleet, one_way);
                }
                return Ok(fleet);
            }
            Attempt::NoSlot => return Err(SaveError::NoSlot),
            Attempt::Exhausted => {}
        }
    }

    // Last resort: hop between the planet and its moon.
    let switch = {
        let state = ctx.state.lock();
        switch_destination(&origin, &state.celestials)
    };
    if let Some(destination) = switch {
        let payload = payload_for(ctx, &origin, &ships, 0);
        let hop = SendRequest::new(origin.id, destination, ships, Mission::Deploy)
            .with_speed(Speed(10))
            .with_payload(payload);
        match try_send(ctx, hop.clone(), request.force).await {
            Ok(fleet) => return Ok(fleet),
            Err(SendRejection::NotEnoughFuel | SendRejection::FuelCapacityExceeded) => {
                // Slowest speed can still be too thirsty once the payload is
                // aboard; retry without it.
                if let Ok(fleet) = try_send(ctx, hop.with_payload(Resources::default()), request.force).await {
                    return Ok(fleet);
                }
            }
            Err(SendRejection::NotEnoughSlots) => return Err(SaveError::NoSlot),
            Err(_) => {}
        }
    }
    Err(SaveError::NoDestination)
}

/// Save one celestial's fleet. The outcome is reported through the
/// notifier either way; a failure is not retried here.
pub async fn fleet_save(ctx: &AgentContext, request: SaveRequest) -> Result<Fleet, SaveError> {
    let result = save(ctx, &request).await;
    match &result {
        Ok(fleet) => {
            info!(
                celestial = %request.celestial,
                fleet = %fleet.id,
                mission = ?fleet.mission,
                to = %fleet.destination,
                "fleet saved"
            );
            ctx.notify(&format!(
                "fleet of {} saved: {:?} to {}, home at {}",
                request.celestial,
                fleet.mission,
                fleet.destination,
                fleet.home_time()
            ))
            .await;
        }
        Err(SaveError::NothingToSave) => {
            debug!(celestial = %request.celestial, "nothing to fleet-save");
        }
        Err(e) => {
            warn!(celestial = %request.celestial, "fleet-save failed: {e}");
            ctx.notify(&format!("fleet-save of {} failed: {e}", request.celestial))
                .await;
        }
    }
    result
}
