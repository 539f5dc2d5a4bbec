use bot_control::{plan_cargo, Plan};
use bot_core::CelestialId;
use tracing::{debug, info, warn};

use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext, id: CelestialId) -> JobOutcome {
    let Some(celestial) = ctx.refresh_celestial(id).await else {
        debug!(celestial = %id, "celestial gone, no ships to build");
        return JobOutcome::idle();
    };
    let settings = ctx.settings().cargo();
    let plan = {
        let state = ctx.state.lock();
        plan_cargo(ctx.rules.as_ref(), &state.researches, state.class, &celestial, &settings)
    };
    match plan {
        Plan::Act(order) => {
            if let Err(e) = ctx.provider.build_ships(id, order.ship, order.count).await {
                warn!(celestial = %id, ship = ?order.ship, "shipyard refused: {e}");
                return JobOutcome::idle();
            }
            info!(celestial = %id, ship = ?order.ship, count = order.count, "ships ordered");
            ctx.refresh_celestial(id).await;
            JobOutcome::idle()
        }
        Plan::Wait(secs) => JobOutcome::after_secs(secs),
        Plan::Idle => JobOutcome::idle(),
    }
}
