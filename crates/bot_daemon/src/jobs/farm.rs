//! AutoFarm round: scan, reset stale targets, read reports, raid, probe.

use anyhow::{Context, Result};
use bot_control::{plan_attacks, plan_probe_waves, FarmSettings};
use bot_core::{Celestial, Coordinate, FarmError, Mission, SendRejection, ShipType, Ships};
use chrono::Duration;
use tracing::{debug, info, warn};

use super::{until, Batch};
use crate::dispatch::{try_send, SendRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext) -> Result<JobOutcome> {
    let settings = ctx.settings();
    let farm = match settings.farm() {
        Ok(farm) => farm.clone(),
        Err(e) => {
            warn!("auto farm disabled: {e}");
            return Ok(JobOutcome::Stop);
        }
    };

    scan(ctx, &farm).await?;
    let now = ctx.now();
    let raiding: Vec<Coordinate> = ctx
        .refresh_fleets()
        .await
        .iter()
        .filter(|f| f.mission == Mission::Attack && !f.return_flight && f.arrival_time > now)
        .map(|f| f.destination)
        .collect();
    let reset = ctx.state.lock().farm.collect_garbage(
        now,
        Duration::hours(farm.report_retention_hours),
        &raiding,
    );
    if reset > 0 {
        debug!(reset, "farm targets back to probing");
    }
    read_reports(ctx, &farm).await?;

    let celestials = ctx.refresh_celestials().await;
    ctx.refresh_slots().await;
    let raids = attack(ctx, &farm, &celestials).await;
    let probes = probe(ctx, &farm, &celestials).await;
    if raids.out_of_slots || probes.out_of_slots {
        return Ok(JobOutcome::Delay);
    }
    if probes.sent > 0 {
        // Reports are readable once the probes arrive.
        let now = ctx.now();
        let landing = ctx
            .state
            .lock()
            .fleets
            .iter()
            .filter(|f| f.mission == Mission::Spy && !f.return_flight)
            .map(|f| f.arrival_time)
            .filter(|t| *t > now)
            .min();
        if let Some(landing) = landing {
            return Ok(JobOutcome::Continue(vec![until(now, landing)]));
        }
    }
    Ok(JobOutcome::idle())
}

async fn scan(ctx: &AgentContext, farm: &FarmSettings) -> Result<()> {
    let mut scanned = Vec::new();
    for system in farm.from_system..=farm.to_system {
        let slots = ctx
            .provider
            .galaxy_system(farm.galaxy, system)
            .await
            .with_context(|| format!("scanning {}:{system}", farm.galaxy))?;
        scanned.extend(slots);
    }
    let candidates = farm.farmable(scanned);
    let mut state = ctx.state.lock();
    state.farm.sync_range(|c| farm.in_range(c), candidates);
    debug!(targets = state.farm.len(), "farm range scanned");
    Ok(())
}

async fn read_reports(ctx: &AgentContext, farm: &FarmSettings) -> Result<()> {
    let reports = ctx
        .provider
        .espionage_reports()
        .await
        .context("reading espionage reports")?;
    let policy = farm.report_policy();
    let mut state = ctx.state.lock();
    for report in reports {
        let coordinate = report.coordinate;
        match state.farm.apply_report(report, &policy) {
            Ok(next) => debug!(at = %coordinate, state = ?next, "report classified"),
            Err(FarmError::UnknownTarget(_)) => {}
            Err(e) => debug!("report ignored: {e}"),
        }
    }
    Ok(())
}

/// The own celestial holding most of `ship`.
fn best_origin(celestials: &[Celestial], ship: ShipType) -> Option<&Celestial> {
    celestials
        .iter()
        .filter(|c| c.ships.get(ship) > 0)
        .max_by_key(|c| (c.ships.get(ship), std::cmp::Reverse(c.id)))
}

async fn attack(ctx: &AgentContext, farm: &FarmSettings, celestials: &[Celestial]) -> Batch {
    let mut batch = Batch::default();
    let Some(origin) = best_origin(celestials, farm.attack_ship) else {
        return batch;
    };
    let raids = {
        let state = ctx.state.lock();
        plan_attacks(
            ctx.rules.as_ref(),
            &state.researches,
            state.class,
            &state.farm,
            &origin.ships,
            farm,
        )
    };
    for (coordinate, ships) in raids {
        let request = SendRequest::new(origin.id, coordinate, ships, Mission::Attack);
        let result = try_send(ctx, request, false).await;
        if result.is_ok() {
            if let Err(e) = ctx.state.lock().farm.mark_attack_sent(&coordinate) {
                warn!("{e}");
            }
            info!(at = %coordinate, ships = ships.total(), "raid sent");
        }
        if !batch.record(&result) {
            break;
        }
    }
    batch
}

async fn probe(ctx: &AgentContext, farm: &FarmSettings, celestials: &[Celestial]) -> Batch {
    let mut batch = Batch::default();
    let Some(origin) = best_origin(celestials, ShipType::EspionageProbe) else {
        return batch;
    };
    let waves = {
        let state = ctx.state.lock();
        plan_probe_waves(
            &state.farm,
            origin.ships.get(ShipType::EspionageProbe),
            farm.base_probes,
        )
    };
    for (coordinate, count) in waves {
        let ships = Ships::of(ShipType::EspionageProbe, count);
        let request = SendRequest::new(origin.id, coordinate, ships, Mission::Spy);
        let result = try_send(ctx, request, false).await;
        match &result {
            Ok(_) => {
                let now = ctx.now();
                if let Err(e) = ctx.state.lock().farm.mark_probes_sent(&coordinate, now) {
                    warn!("{e}");
                }
            }
            Err(SendRejection::NotEnoughSlots) => {}
            Err(rejection) => debug!(at = %coordinate, "probes not sent: {rejection}"),
        }
        if !batch.record(&result) {
            break;
        }
    }
    debug!(waves = batch.sent, "probe waves sent");
    batch
}
