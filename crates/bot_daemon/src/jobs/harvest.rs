use anyhow::{Context, Result};
use bot_control::plan_harvests;
use bot_core::Mission;
use tracing::debug;

use super::Batch;
use crate::dispatch::{try_send, SendRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

/// Debris fields only matter at our own positions, so only our own systems
/// are scanned.
pub(super) async fn run(ctx: &AgentContext) -> Result<JobOutcome> {
    let celestials = ctx.refresh_celestials().await;
    ctx.refresh_slots().await;
    let mut systems: Vec<(u32, u32)> = celestials
        .iter()
        .map(|c| (c.coordinate.galaxy, c.coordinate.system))
        .collect();
    systems.sort_unstable();
    systems.dedup();

    let mut scanned = Vec::new();
    for (galaxy, system) in systems {
        let slots = ctx
            .provider
            .galaxy_system(galaxy, system)
            .await
            .with_context(|| format!("scanning {galaxy}:{system}"))?;
        scanned.extend(slots);
    }

    let settings = ctx.settings().harvest();
    let plans = {
        let state = ctx.state.lock();
        plan_harvests(
            ctx.rules.as_ref(),
            &state.researches,
            state.class,
            &celestials,
            &scanned,
            &settings,
        )
    };
    let mut batch = Batch::default();
    for plan in plans {
        let result = try_send(
            ctx,
            SendRequest::new(plan.origin, plan.field, plan.ships, Mission::Harvest),
            false,
        )
        .await;
        if !batch.record(&result) {
            break;
        }
    }
    debug!(sent = batch.sent, "harvest round done");
    Ok(if batch.out_of_slots {
        JobOutcome::Delay
    } else {
        JobOutcome::idle()
    })
}
