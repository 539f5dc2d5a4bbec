use bot_control::{expedition_origin, expedition_target, plan_expeditions};
use bot_core::Mission;
use tracing::{debug, info};

use super::Batch;
use crate::dispatch::{try_send, SendRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

/// Fill every free expedition slot, then sleep until something returns.
pub(super) async fn run(ctx: &AgentContext) -> JobOutcome {
    let celestials = ctx.refresh_celestials().await;
    let slots = ctx.refresh_slots().await;
    ctx.refresh_fleets().await;
    let settings = ctx.settings().expeditions();
    let origin = {
        let state = ctx.state.lock();
        expedition_origin(
            ctx.rules.as_ref(),
            &state.researches,
            state.class,
            &celestials,
            settings.origin,
        )
        .cloned()
    };
    let Some(origin) = origin else {
        debug!("no celestial to launch expeditions from");
        return JobOutcome::idle();
    };

    let fleets = plan_expeditions(&origin, &slots, &settings);
    if fleets.is_empty() {
        debug!(free = slots.expedition_free(), "no expedition to launch");
        return JobOutcome::Delay;
    }
    let target = expedition_target(&origin.coordinate, &settings);
    let mut batch = Batch::default();
    for ships in fleets {
        let result = try_send(
            ctx,
            SendRequest::new(origin.id, target, ships, Mission::Expedition),
            false,
        )
        .await;
        if !batch.record(&result) {
            break;
        }
    }
    if batch.sent > 0 {
        info!(from = %origin.coordinate, to = %target, launched = batch.sent, "expeditions out");
    }
    JobOutcome::Delay
}
