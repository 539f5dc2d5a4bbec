//! One handler per feature, dispatched from a single [`JobRunner`].

mod cargo;
mod colonize;
mod defender;
mod expedition;
mod farm;
mod harvest;
mod mine;
mod repatriate;
mod research;
mod sleep_mode;

use std::time::Duration;

use async_trait::async_trait;
use bot_core::{Feature, SendRejection};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::scheduler::{JobOutcome, JobRunner, Scheduler, TimerKey};

/// The production handler set.
#[derive(Debug, Default, Clone, Copy)]
pub struct Handlers;

#[async_trait]
impl JobRunner for Handlers {
    async fn run(&self, key: TimerKey, scheduler: &Scheduler) -> anyhow::Result<JobOutcome> {
        let ctx = scheduler.context();
        if key.feature.spends_resources() && ctx.is_asleep() {
            debug!(timer = %key, "asleep, skipping");
            return Ok(JobOutcome::idle());
        }
        match (key.feature, key.celestial) {
            (Feature::Defender, _) => defender::run(ctx).await,
            (Feature::AutoMine, Some(id)) => Ok(mine::run(ctx, id).await),
            (Feature::AutoCargo, Some(id)) => Ok(cargo::run(ctx, id).await),
            (Feature::AutoResearch, _) => Ok(research::run(ctx).await),
            (Feature::AutoRepatriate, _) => Ok(repatriate::run(ctx).await),
            (Feature::AutoFarm, _) => farm::run(ctx).await,
            (Feature::Expeditions, _) => Ok(expedition::run(ctx).await),
            (Feature::Harvest, _) => harvest::run(ctx).await,
            (Feature::Colonize, _) => colonize::run(ctx).await,
            (Feature::SleepMode, _) => Ok(sleep_mode::run(scheduler).await),
            // Roots of per-celestial features fan out in the scheduler.
            (Feature::Brain | Feature::AutoMine | Feature::AutoCargo, _) => {
                Ok(JobOutcome::idle())
            }
        }
    }
}

/// Time from `now` until `then`, zero when it already passed.
pub(crate) fn until(now: DateTime<Utc>, then: DateTime<Utc>) -> Duration {
    (then - now).to_std().unwrap_or_default()
}

/// How a batch of sends ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Batch {
    pub sent: usize,
    /// The batch stopped because no slot was left.
    pub out_of_slots: bool,
}

impl Batch {
    /// Record one send result; returns false when the batch should stop.
    pub fn record<T>(&mut self, result: &Result<T, SendRejection>) -> bool {
        match result {
            Ok(_) => {
                self.sent += 1;
                true
            }
            Err(SendRejection::NotEnoughSlots) => {
                self.out_of_slots = true;
                false
            }
            Err(_) => true,
        }
    }
}
