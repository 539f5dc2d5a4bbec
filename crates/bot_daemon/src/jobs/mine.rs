use bot_control::{plan_mine, Plan};
use bot_core::CelestialId;
use tracing::{debug, info, warn};

use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext, id: CelestialId) -> JobOutcome {
    let Some(celestial) = ctx.refresh_celestial(id).await else {
        debug!(celestial = %id, "celestial gone, nothing to build");
        return JobOutcome::idle();
    };
    let settings = ctx.settings().mine();
    let plan = {
        let state = ctx.state.lock();
        plan_mine(ctx.rules.as_ref(), &state.flight(), &celestial, &settings)
    };
    let order = match plan {
        Plan::Act(order) => order,
        Plan::Wait(secs) => return JobOutcome::after_secs(secs),
        Plan::Idle => return JobOutcome::idle(),
    };

    if let Err(e) = ctx.provider.build(id, order.buildable).await {
        warn!(celestial = %id, buildable = ?order.buildable, "build refused: {e}");
        return JobOutcome::idle();
    }
    info!(
        celestial = %id,
        buildable = ?order.buildable,
        level = order.level,
        "construction started"
    );
    let running = ctx
        .refresh_celestial(id)
        .await
        .and_then(|c| c.constructions.building)
        .map(|(_, secs)| secs);
    running.map_or_else(JobOutcome::idle, JobOutcome::after_secs)
}
