use bot_control::{plan_research, research_lab, Plan};
use tracing::{debug, info, warn};

use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext) -> JobOutcome {
    let celestials = ctx.refresh_celestials().await;
    let researches = ctx.refresh_researches().await;
    let settings = ctx.settings().research();
    let Some(lab) = research_lab(&celestials, settings.lab) else {
        debug!("no research lab on the account");
        return JobOutcome::idle();
    };
    let plan = {
        let state = ctx.state.lock();
        plan_research(
            ctx.rules.as_ref(),
            &state.universe,
            &researches,
            &celestials,
            lab,
            &settings,
        )
    };
    match plan {
        Plan::Act(order) => {
            if let Err(e) = ctx.provider.research(order.celestial, order.research).await {
                warn!(research = ?order.research, "research refused: {e}");
                return JobOutcome::idle();
            }
            info!(
                celestial = %order.celestial,
                research = ?order.research,
                level = order.level,
                "research started"
            );
            ctx.refresh_celestial(order.celestial).await;
            JobOutcome::after_secs(order.duration_secs)
        }
        Plan::Wait(secs) => JobOutcome::after_secs(secs),
        Plan::Idle => JobOutcome::idle(),
    }
}
