use anyhow::{Context, Result};
use bot_control::{plan_colonization, ColonizeSkip};
use bot_core::{Coordinate, Mission, SendRejection, ShipType, Ships};
use tracing::{debug, info, warn};

use crate::dispatch::{try_send, SendRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext) -> Result<JobOutcome> {
    let settings = ctx.settings();
    let colonize = match settings.colonize() {
        Ok(colonize) => colonize.clone(),
        Err(e) => {
            warn!("colonize disabled: {e}");
            return Ok(JobOutcome::Stop);
        }
    };
    let celestials = ctx.refresh_celestials().await;
    let researches = ctx.refresh_researches().await;
    let fleets = ctx.refresh_fleets().await;
    ctx.refresh_slots().await;

    let mut systems: Vec<(u32, u32)> = colonize
        .targets
        .iter()
        .map(|t| (t.galaxy, t.system))
        .collect();
    systems.sort_unstable();
    systems.dedup();
    // Targets a colony ship is already flying to count as taken.
    let mut occupied: Vec<Coordinate> = fleets
        .iter()
        .filter(|f| f.mission == Mission::Colonize && !f.return_flight)
        .map(|f| f.destination)
        .collect();
    for (galaxy, system) in systems {
        let slots = ctx
            .provider
            .galaxy_system(galaxy, system)
            .await
            .with_context(|| format!("scanning {galaxy}:{system}"))?;
        occupied.extend(
            slots
                .into_iter()
                .filter(|s| s.occupant.is_some())
                .map(|s| s.coordinate),
        );
    }

    let plan = {
        let state = ctx.state.lock();
        plan_colonization(
            ctx.rules.as_ref(),
            &state.universe,
            &researches,
            &celestials,
            &occupied,
            &colonize,
        )
    };
    let plan = match plan {
        Ok(plan) => plan,
        Err(ColonizeSkip::NoTargetLeft) => {
            info!("every colonize target is taken");
            return Ok(JobOutcome::Stop);
        }
        Err(skip) => {
            debug!(?skip, "not colonizing");
            return Ok(JobOutcome::idle());
        }
    };
    let Some(origin) = celestials.iter().find(|c| c.coordinate == plan.from) else {
        return Ok(JobOutcome::idle());
    };
    let request = SendRequest::new(
        origin.id,
        plan.to,
        Ships::of(ShipType::ColonyShip, 1),
        Mission::Colonize,
    );
    match try_send(ctx, request, false).await {
        Ok(fleet) => {
            info!(from = %plan.from, to = %plan.to, arrival = %fleet.arrival_time, "colony ship sent");
            Ok(JobOutcome::idle())
        }
        Err(SendRejection::NotEnoughSlots) => Ok(JobOutcome::Delay),
        Err(rejection) => {
            debug!(to = %plan.to, "colony ship not sent: {rejection}");
            Ok(JobOutcome::idle())
        }
    }
}
