//! Feature timers, per-feature exclusion and the re-arm contract.
//!
//! Every armed timer lives in one registry keyed by [`TimerKey`]. A timer
//! only sleeps; when it fires it spawns the execution as a separate task, so
//! stopping a feature cancels what is pending without interrupting a handler
//! that is already running. Each arm gets a fresh generation number and an
//! execution re-arms only if its generation is still the registered one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bot_config::Settings;
use bot_core::{evaluate, next_delay, CelestialId, Feature};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::AgentContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerKey {
    pub feature: Feature,
    /// Set on the per-celestial sub-timers of AutoMine and AutoCargo.
    pub celestial: Option<CelestialId>,
}

impl TimerKey {
    pub fn root(feature: Feature) -> Self {
        Self {
            feature,
            celestial: None,
        }
    }

    pub fn sub(feature: Feature, celestial: CelestialId) -> Self {
        Self {
            feature,
            celestial: Some(celestial),
        }
    }
}

impl std::fmt::Display for TimerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.celestial {
            Some(id) => write!(f, "{}@{id}", self.feature),
            None => write!(f, "{}", self.feature),
        }
    }
}

/// What a handler wants the scheduler to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Run again. Each hint is a lower bound on when anything can change.
    Continue(Vec<Duration>),
    /// Nothing to do until a fleet is back.
    Delay,
    /// Disable the feature until it is reinitialised.
    Stop,
}

impl JobOutcome {
    pub fn idle() -> Self {
        JobOutcome::Continue(Vec::new())
    }

    pub fn after_secs(secs: u64) -> Self {
        JobOutcome::Continue(vec![Duration::from_secs(secs)])
    }
}

#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, key: TimerKey, scheduler: &Scheduler) -> anyhow::Result<JobOutcome>;
}

struct TimerEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerRegistry {
    next_generation: u64,
    entries: HashMap<TimerKey, TimerEntry>,
}

impl TimerRegistry {
    fn is_current(&self, key: &TimerKey, generation: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.generation == generation)
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&TimerKey) -> bool) -> usize {
        let keys: Vec<TimerKey> = self.entries.keys().copied().filter(|k| pred(k)).collect();
        for key in &keys {
            if let Some(entry) = self.entries.remove(key) {
                entry.handle.abort();
            }
        }
        keys.len()
    }
}

struct Inner {
    ctx: AgentContext,
    runner: Arc<dyn JobRunner>,
    locks: HashMap<Feature, Arc<Semaphore>>,
    /// Read side: asset-moving handlers. Write side: reload, shutdown,
    /// the sleep transition.
    group: Arc<RwLock<()>>,
    timers: Mutex<TimerRegistry>,
    /// Features that returned `Stop`; kept off until reinitialised.
    halted: Mutex<HashSet<Feature>>,
    rng: Mutex<StdRng>,
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(ctx: AgentContext, runner: Arc<dyn JobRunner>) -> Self {
        Self::with_rng(ctx, runner, StdRng::from_entropy())
    }

    pub fn with_rng(ctx: AgentContext, runner: Arc<dyn JobRunner>, rng: StdRng) -> Self {
        let locks = Feature::ALL
            .into_iter()
            .map(|f| (f, Arc::new(Semaphore::new(1))))
            .collect();
        Self {
            inner: Arc::new(Inner {
                ctx,
                runner,
                locks,
                group: Arc::new(RwLock::new(())),
                timers: Mutex::new(TimerRegistry::default()),
                halted: Mutex::new(HashSet::new()),
                rng: Mutex::new(rng),
            }),
        }
    }

    pub fn context(&self) -> &AgentContext {
        &self.inner.ctx
    }

    // -----------------------------------------------------------------------
    // Start / stop
    // -----------------------------------------------------------------------

    /// Arm the feature's root timer after an initial jitter. No-op when
    /// already armed.
    pub fn start(&self, feature: Feature) {
        if !feature.is_job() {
            return;
        }
        let key = TimerKey::root(feature);
        let jitter = self.inner.ctx.settings().scheduler.jitter;
        let mut timers = self.inner.timers.lock();
        if timers.entries.contains_key(&key) {
            return;
        }
        let delay = jitter.sample(&mut *self.inner.rng.lock());
        self.arm_locked(&mut timers, key, delay);
        info!(feature = %feature, first_run_in_secs = delay.as_secs(), "feature started");
    }

    /// Cancel the feature's timer and every sub-timer it spawned. A running
    /// handler finishes but is not re-armed.
    pub fn stop(&self, feature: Feature) {
        let removed = self
            .inner
            .timers
            .lock()
            .remove_where(|k| k.feature == feature);
        if removed > 0 {
            info!(feature = %feature, timers = removed, "feature stopped");
        }
    }

    pub fn is_running(&self, feature: Feature) -> bool {
        self.inner
            .timers
            .lock()
            .entries
            .contains_key(&TimerKey::root(feature))
    }

    /// Timers currently armed for `feature`, sub-timers included.
    pub fn armed_timers(&self, feature: Feature) -> usize {
        self.inner
            .timers
            .lock()
            .entries
            .keys()
            .filter(|k| k.feature == feature)
            .count()
    }

    pub fn armed_keys(&self) -> Vec<TimerKey> {
        let mut keys: Vec<TimerKey> = self.inner.timers.lock().entries.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn is_halted(&self, feature: Feature) -> bool {
        self.inner.halted.lock().contains(&feature)
    }

    /// Start or stop `feature` to match its evaluated state.
    pub fn apply(&self, feature: Feature) -> bool {
        let toggles = self.inner.ctx.settings().toggles();
        let asleep = self.inner.ctx.is_asleep();
        let wanted = evaluate(feature, &toggles, asleep) && !self.is_halted(feature);
        if wanted {
            self.start(feature);
        } else {
            self.stop(feature);
        }
        wanted
    }

    pub fn apply_all(&self) {
        for feature in Feature::ALL {
            self.apply(feature);
        }
    }

    /// Forget earlier `Stop` outcomes.
    pub fn reinitialize(&self) {
        self.inner.halted.lock().clear();
    }

    fn halt(&self, feature: Feature) {
        self.inner.halted.lock().insert(feature);
        self.stop(feature);
    }

    // -----------------------------------------------------------------------
    // Global lifecycle
    // -----------------------------------------------------------------------

    /// Wait until no asset-moving handler runs, and keep new ones out while
    /// the guard lives.
    pub async fn exclusive(&self) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(&self.inner.group).write_owned().await
    }

    /// Swap settings with every asset-moving handler parked, then
    /// re-evaluate all features. Turning sleep mode off also wakes the agent.
    pub async fn reload(&self, settings: Settings) {
        {
            let _guard = self.exclusive().await;
            if !settings.features.is_active(Feature::SleepMode) {
                self.inner.ctx.state.lock().asleep = false;
            }
            self.inner.ctx.replace_settings(settings);
            self.reinitialize();
        }
        info!("settings reloaded");
        self.apply_all();
    }

    /// Wait for every running handler, then cancel all timers for good.
    pub async fn shutdown(&self) {
        let mut permits = Vec::new();
        for feature in Feature::ALL {
            if let Some(lock) = self.inner.locks.get(&feature) {
                if let Ok(permit) = Arc::clone(lock).acquire_owned().await {
                    permits.push(permit);
                }
            }
        }
        let _guard = self.exclusive().await;
        for feature in Feature::ALL {
            self.stop(feature);
        }
        for lock in self.inner.locks.values() {
            lock.close();
        }
        info!("scheduler shut down");
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn arm_locked(&self, timers: &mut TimerRegistry, key: TimerKey, delay: Duration) {
        let generation = timers.next_generation;
        timers.next_generation += 1;
        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.fire(key, generation);
        });
        if let Some(old) = timers.entries.insert(key, TimerEntry { generation, handle }) {
            old.handle.abort();
        }
        debug!(timer = %key, in_secs = delay.as_secs(), "armed");
    }

    /// Re-arm unless the timer was stopped or replaced meanwhile.
    fn rearm(&self, key: TimerKey, generation: u64, delay: Duration) {
        let mut timers = self.inner.timers.lock();
        if timers.is_current(&key, generation) {
            self.arm_locked(&mut timers, key, delay);
        }
    }

    fn fire(&self, key: TimerKey, generation: u64) {
        if !self.inner.timers.lock().is_current(&key, generation) {
            return;
        }
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.execute(key, generation).await });
    }

    async fn execute(self, key: TimerKey, generation: u64) {
        let feature = key.feature;
        let Some(lock) = self.inner.locks.get(&feature).cloned() else {
            return;
        };
        let Ok(_permit) = lock.acquire_owned().await else {
            return;
        };
        if !self.inner.timers.lock().is_current(&key, generation) {
            return;
        }
        let _shared = if feature.moves_assets() {
            Some(Arc::clone(&self.inner.group).read_owned().await)
        } else {
            None
        };

        let outcome = if feature.per_celestial() && key.celestial.is_none() {
            self.fan_out(feature, generation).await;
            Ok(JobOutcome::idle())
        } else {
            self.inner.runner.run(key, &self).await
        };

        let delay = match outcome {
            Ok(JobOutcome::Continue(hints)) => self.delay_from_hints(feature, hints),
            Ok(JobOutcome::Delay) => self.delay_until_return(feature),
            Ok(JobOutcome::Stop) => {
                warn!(timer = %key, "handler asked to stop; feature disabled until reload");
                self.halt(feature);
                return;
            }
            Err(e) => {
                warn!(timer = %key, "handler failed: {e:#}");
                self.delay_from_hints(feature, Vec::new())
            }
        };
        self.rearm(key, generation, delay);
    }

    /// Root run of a per-celestial feature: one sub-timer per celestial,
    /// none for celestials that are gone.
    async fn fan_out(&self, feature: Feature, generation: u64) {
        let ids: Vec<CelestialId> = self
            .inner
            .ctx
            .refresh_celestials()
            .await
            .iter()
            .map(|c| c.id)
            .collect();
        let jitter = self.inner.ctx.settings().scheduler.jitter;
        let mut timers = self.inner.timers.lock();
        if !timers.is_current(&TimerKey::root(feature), generation) {
            return;
        }
        timers.remove_where(|k| {
            k.feature == feature && k.celestial.is_some_and(|id| !ids.contains(&id))
        });
        for id in ids {
            let key = TimerKey::sub(feature, id);
            if !timers.entries.contains_key(&key) {
                let delay = jitter.sample(&mut *self.inner.rng.lock());
                self.arm_locked(&mut timers, key, delay);
            }
        }
    }

    fn delay_from_hints(&self, feature: Feature, hints: Vec<Duration>) -> Duration {
        let settings = self.inner.ctx.settings();
        let window = settings.check_window(feature);
        next_delay(
            hints,
            &window,
            &settings.scheduler.jitter,
            &mut *self.inner.rng.lock(),
        )
    }

    fn delay_until_return(&self, feature: Feature) -> Duration {
        let now = self.inner.ctx.now();
        let earliest = self.inner.ctx.state.lock().earliest_return(now);
        match earliest.and_then(|t| (t - now).to_std().ok()) {
            Some(wait) => {
                let jitter = self.inner.ctx.settings().scheduler.jitter;
                wait + jitter.sample(&mut *self.inner.rng.lock())
            }
            None => self.delay_from_hints(feature, Vec::new()),
        }
    }
}
