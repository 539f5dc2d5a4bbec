//! The sleep gate as a job: evacuate and pause spending at night, resume
//! in the morning.

use bot_config::Settings;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::until;
use crate::fleet_saver::{fleet_save, SaveError, SaveRequest};
use crate::scheduler::{JobOutcome, Scheduler};
use crate::sleep_gate::{evacuation_order, next_step, SleepStep};

pub(super) async fn run(scheduler: &Scheduler) -> JobOutcome {
    let ctx = scheduler.context();
    let settings = ctx.settings();
    let window = match settings.sleep_window() {
        Ok(Some(window)) => window,
        Ok(None) => {
            warn!("sleep mode is on but no sleep window is configured");
            force_awake(scheduler);
            return JobOutcome::Stop;
        }
        Err(e) => {
            warn!("sleep mode disabled: {e}");
            force_awake(scheduler);
            return JobOutcome::Stop;
        }
    };

    let fleets = ctx.refresh_fleets().await;
    let now = ctx.now();
    let step = next_step(&window, now, ctx.is_asleep(), &fleets);
    match step {
        SleepStep::StayAwake { .. } | SleepStep::StayAsleep { .. } => {}
        SleepStep::Defer { until: resume } => {
            info!(%resume, "a fleet lands inside the sleep window, sleep deferred");
        }
        SleepStep::FallAsleep { wake_at } => fall_asleep(scheduler, &settings, wake_at).await,
        SleepStep::WakeUp { sleep_at } => wake_up(scheduler, sleep_at).await,
    }
    JobOutcome::Continue(vec![until(ctx.now(), step.next_check())])
}

async fn fall_asleep(scheduler: &Scheduler, settings: &Settings, wake_at: DateTime<Utc>) {
    let ctx = scheduler.context();
    {
        let _exclusive = scheduler.exclusive().await;
        if let Some(sleep) = settings.sleep.as_ref().filter(|s| s.fleet_save) {
            let celestials = ctx.refresh_celestials().await;
            let order = evacuation_order(ctx.rules.as_ref(), &celestials, sleep.moons_only);
            let min = until(ctx.now(), wake_at).as_secs();
            for id in order {
                if let Err(SaveError::NoSlot) = fleet_save(ctx, SaveRequest::new(id, min)).await {
                    warn!("out of slots, evacuation stopped");
                    break;
                }
            }
        }
        ctx.state.lock().asleep = true;
    }
    info!(%wake_at, "asleep");
    scheduler.apply_all();
    ctx.notify(&format!("going to sleep until {wake_at}")).await;
}

async fn wake_up(scheduler: &Scheduler, sleep_at: DateTime<Utc>) {
    let ctx = scheduler.context();
    ctx.state.lock().asleep = false;
    info!(next_sleep = %sleep_at, "awake");
    scheduler.apply_all();
    ctx.notify(&format!("awake until {sleep_at}")).await;
}

/// A broken window must never leave the agent parked.
fn force_awake(scheduler: &Scheduler) {
    let was_asleep = std::mem::replace(&mut scheduler.context().state.lock().asleep, false);
    if was_asleep {
        scheduler.apply_all();
    }
}
