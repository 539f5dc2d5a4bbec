use anyhow::{Context, Result};
use bot_control::threats;
use bot_core::EventId;
use chrono::Duration;
use tracing::warn;

use crate::fleet_saver::{fleet_save, SaveRequest};
use crate::scheduler::JobOutcome;
use crate::state::AgentContext;

/// Leave at least this long before impact.
const DEPARTURE_MARGIN_SECS: i64 = 60;

/// React once to every new hostile event: notify, then fleet-save the
/// target. Events already handled are skipped until they leave the list.
pub(super) async fn run(ctx: &AgentContext) -> Result<JobOutcome> {
    let events = ctx
        .provider
        .hostile_events()
        .await
        .context("reading hostile events")?;
    let celestials = ctx.refresh_celestials().await;
    let settings = ctx.settings().defender();
    ctx.state
        .lock()
        .handled_events
        .retain(|id| events.iter().any(|e| e.id == *id));

    let now = ctx.now();
    for threat in threats(&events, &celestials, &settings) {
        let fresh: Vec<EventId> = {
            let mut state = ctx.state.lock();
            threat
                .events
                .iter()
                .map(|e| e.id)
                .filter(|id| state.handled_events.insert(*id))
                .collect()
        };
        if fresh.is_empty() {
            continue;
        }
        warn!(
            celestial = %threat.celestial,
            at = %threat.coordinate,
            impact = %threat.arrival,
            events = fresh.len(),
            "under attack"
        );
        if settings.notify {
            ctx.notify(&format!(
                "{} at {} attacked, impact at {}",
                threat.celestial, threat.coordinate, threat.arrival
            ))
            .await;
        }
        let request = SaveRequest {
            celestial: threat.celestial,
            min_duration_secs: threat.min_save_secs(now, &settings),
            force: true,
            deadline: Some(threat.arrival - Duration::seconds(DEPARTURE_MARGIN_SECS)),
        };
        // Reported inside; a failed save is not retried.
        let _ = fleet_save(ctx, request).await;
    }
    Ok(JobOutcome::idle())
}
