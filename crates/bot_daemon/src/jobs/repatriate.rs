use bot_control::plan_repatriation;
use bot_core::Mission;
use tracing::debug;

use super::Batch;
use crate::dispatch::{try_send, SendRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

pub(super) async fn run(ctx: &AgentContext) -> JobOutcome {
    let celestials = ctx.refresh_celestials().await;
    ctx.refresh_slots().await;
    let settings = ctx.settings().repatriate();
    let plans = {
        let state = ctx.state.lock();
        plan_repatriation(ctx.rules.as_ref(), &state.flight(), &celestials, &settings)
    };
    if plans.is_empty() {
        debug!("nothing worth repatriating");
        return JobOutcome::idle();
    }

    let mut batch = Batch::default();
    for plan in plans {
        let request = SendRequest::new(plan.origin, plan.to, plan.ships, Mission::Transport)
            .with_payload(plan.payload);
        let result = try_send(ctx, request, false).await;
        if !batch.record(&result) {
            break;
        }
    }
    debug!(sent = batch.sent, "repatriation round done");
    if batch.out_of_slots {
        JobOutcome::Delay
    } else {
        JobOutcome::idle()
    }
}
