use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use bot_config::Settings;
use bot_core::{
    Celestial, CelestialId, EventId, FarmTable, Fleet, FlightContext, GameRules, PlayerClass,
    Researches, Slots, UniverseInfo,
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::warn;

use crate::clock::Clock;
use crate::notify::{notify, Notifier};
use crate::provider::GameProvider;

/// Cached view of the account. Readers refresh through the provider rather
/// than trusting anything older than one tick.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub universe: UniverseInfo,
    pub class: PlayerClass,
    pub researches: Researches,
    pub celestials: Vec<Celestial>,
    pub fleets: Vec<Fleet>,
    pub slots: Slots,
    pub farm: FarmTable,
    pub asleep: bool,
    /// Hostile events the defender already reacted to.
    pub handled_events: HashSet<EventId>,
}

impl AgentState {
    pub fn new(universe: UniverseInfo) -> Self {
        Self {
            universe,
            class: PlayerClass::None,
            researches: Researches::default(),
            celestials: Vec::new(),
            fleets: Vec::new(),
            slots: Slots::default(),
            farm: FarmTable::new(),
            asleep: false,
            handled_events: HashSet::new(),
        }
    }

    pub fn celestial(&self, id: CelestialId) -> Option<&Celestial> {
        self.celestials.iter().find(|c| c.id == id)
    }

    pub fn celestial_mut(&mut self, id: CelestialId) -> Option<&mut Celestial> {
        self.celestials.iter_mut().find(|c| c.id == id)
    }

    pub fn flight(&self) -> FlightContext<'_> {
        FlightContext {
            universe: &self.universe,
            researches: &self.researches,
            class: self.class,
        }
    }

    /// Earliest moment any of our fleets is home again.
    pub fn earliest_return(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.fleets
            .iter()
            .map(Fleet::home_time)
            .filter(|t| *t > now)
            .min()
    }
}

pub type SharedState = Arc<Mutex<AgentState>>;

/// Everything a job handler works with. Cheap to clone.
#[derive(Clone)]
pub struct AgentContext {
    pub provider: Arc<dyn GameProvider>,
    pub rules: Arc<dyn GameRules>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub state: SharedState,
    settings: Arc<RwLock<Arc<Settings>>>,
}

impl AgentContext {
    pub fn new(
        provider: Arc<dyn GameProvider>,
        rules: Arc<dyn GameRules>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        state: AgentState,
        settings: Settings,
    ) -> Self {
        Self {
            provider,
            rules,
            clock,
            notifier,
            state: Arc::new(Mutex::new(state)),
            settings: Arc::new(RwLock::new(Arc::new(settings))),
        }
    }

    /// Fetch the account once. Unlike per-tick refreshes a failure here is
    /// fatal: without universe parameters nothing can be predicted.
    pub async fn bootstrap(
        provider: Arc<dyn GameProvider>,
        rules: Arc<dyn GameRules>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        settings: Settings,
    ) -> Result<Self> {
        let universe = provider.server_data().await.context("fetching server data")?;
        let mut state = AgentState::new(universe);
        state.class = provider.player_class().await.context("fetching player class")?;
        state.researches = provider.researches().await.context("fetching researches")?;
        state.celestials = provider.celestials().await.context("fetching celestials")?;
        state.fleets = provider.fleets().await.context("fetching fleets")?;
        state.slots = provider.slots().await.context("fetching slots")?;
        Ok(Self::new(provider, rules, clock, notifier, state, settings))
    }

    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings.read())
    }

    pub fn replace_settings(&self, settings: Settings) {
        *self.settings.write() = Arc::new(settings);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_asleep(&self) -> bool {
        self.state.lock().asleep
    }

    pub fn snapshot(&self) -> AgentState {
        self.state.lock().clone()
    }

    pub async fn notify(&self, message: &str) {
        notify(self.notifier.as_ref(), message).await;
    }

    // -----------------------------------------------------------------------
    // Refreshes: failures are logged and the stale cache is kept.
    // -----------------------------------------------------------------------

    pub async fn refresh_celestials(&self) -> Vec<Celestial> {
        match self.provider.celestials().await {
            Ok(celestials) => {
                self.state.lock().celestials.clone_from(&celestials);
                celestials
            }
            Err(e) => {
                warn!("keeping cached celestials: {e}");
                self.state.lock().celestials.clone()
            }
        }
    }

    pub async fn refresh_celestial(&self, id: CelestialId) -> Option<Celestial> {
        match self.provider.celestial(id).await {
            Ok(fresh) => {
                let mut state = self.state.lock();
                match state.celestial_mut(id) {
                    Some(slot) => *slot = fresh.clone(),
                    None => state.celestials.push(fresh.clone()),
                }
                Some(fresh)
            }
            Err(e) => {
                warn!(celestial = %id, "keeping cached celestial: {e}");
                self.state.lock().celestial(id).cloned()
            }
        }
    }

    pub async fn refresh_fleets(&self) -> Vec<Fleet> {
        match self.provider.fleets().await {
            Ok(fleets) => {
                self.state.lock().fleets.clone_from(&fleets);
                fleets
            }
            Err(e) => {
                warn!("keeping cached fleets: {e}");
                self.state.lock().fleets.clone()
            }
        }
    }

    pub async fn refresh_slots(&self) -> Slots {
        match self.provider.slots().await {
            Ok(slots) => {
                self.state.lock().slots = slots;
                slots
            }
            Err(e) => {
                warn!("keeping cached slots: {e}");
                self.state.lock().slots
            }
        }
    }

    pub async fn refresh_researches(&self) -> Researches {
        match self.provider.researches().await {
            Ok(researches) => {
                self.state.lock().researches = researches;
                researches
            }
            Err(e) => {
                warn!("keeping cached researches: {e}");
                self.state.lock().researches
            }
        }
    }
}
