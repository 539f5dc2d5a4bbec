//! Top-level wiring: start the scheduler, watch the settings file, shut
//! down cleanly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bot_config::{Settings, SettingsWatcher};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::jobs::Handlers;
use crate::scheduler::Scheduler;
use crate::state::AgentContext;

pub fn scheduler_for(ctx: AgentContext) -> Scheduler {
    Scheduler::new(ctx, Arc::new(Handlers))
}

fn log_unconfigured(settings: &Settings) {
    for (feature, section) in settings.unconfigured() {
        if section.is_required() {
            warn!(%feature, ?section, "switched on without its settings section; it will not run");
        } else {
            debug!(%feature, ?section, "running on default settings");
        }
    }
}

/// Poll the settings file and hot-reload on change. A broken edit is
/// logged and the running settings stay in force.
pub async fn run_reload_loop(scheduler: Scheduler, mut watcher: SettingsWatcher, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the file was just loaded.
    interval.tick().await;
    loop {
        interval.tick().await;
        match watcher.poll() {
            Ok(Some(settings)) => {
                log_unconfigured(&settings);
                scheduler.reload(settings).await;
            }
            Ok(None) => {}
            Err(e) => warn!(path = %watcher.path().display(), "settings not reloaded: {e:#}"),
        }
    }
}

/// Run until `shutdown` resolves.
pub async fn run(
    scheduler: Scheduler,
    watcher: Option<SettingsWatcher>,
    reload_every: Duration,
    shutdown: impl Future<Output = ()>,
) {
    log_unconfigured(&scheduler.context().settings());
    scheduler.apply_all();
    info!(timers = scheduler.armed_keys().len(), "agent running");
    let reloader = watcher.map(|w| tokio::spawn(run_reload_loop(scheduler.clone(), w, reload_every)));

    shutdown.await;
    info!("shutdown requested");
    if let Some(reloader) = reloader {
        reloader.abort();
    }
    scheduler.shutdown().await;
}
