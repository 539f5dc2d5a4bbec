#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bot_config::{parse_settings, Settings, UniverseSnapshot};
use bot_core::test_fixtures::{planet, researches, slots, universe, PinnedRules};
use bot_core::{Celestial, CelestialId, Coordinate, GameRules, PlayerClass, Resources, ShipType, Ships};
use bot_daemon::{AgentContext, ManualClock, Notifier, SimulatedProvider};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

pub fn home() -> Coordinate {
    Coordinate::planet(1, 100, 4)
}

pub fn colony() -> Coordinate {
    Coordinate::planet(1, 102, 8)
}

/// Home with ten small cargos and some stock, plus an empty colony to
/// deploy to.
pub fn two_planets() -> Vec<Celestial> {
    let mut main = planet(1, home());
    main.ships = Ships::of(ShipType::SmallCargo, 10);
    main.resources = Resources::new(20_000, 10_000, 5000);
    vec![main, planet(2, colony())]
}

pub fn snapshot(celestials: Vec<Celestial>) -> UniverseSnapshot {
    UniverseSnapshot {
        universe: universe(),
        class: PlayerClass::None,
        researches: researches(),
        celestials,
        fleets: Vec::new(),
        slots: slots(4, 0),
        galaxy: Vec::new(),
        reports: Vec::new(),
        hostile: Vec::new(),
    }
}

pub fn settings(json: &str) -> Settings {
    parse_settings(json).unwrap()
}

pub fn pinned(one_way_secs: u64, fuel: u64) -> Arc<dyn GameRules> {
    Arc::new(PinnedRules {
        one_way_secs,
        fuel: Some(fuel),
    })
}

/// Keeps every notification for assertions.
#[derive(Debug, Default)]
pub struct Recorder {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for Recorder {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub ctx: AgentContext,
    pub sim: Arc<SimulatedProvider>,
    pub clock: Arc<ManualClock>,
    pub notes: Arc<Recorder>,
}

impl Harness {
    pub async fn new(
        snapshot: UniverseSnapshot,
        rules: Arc<dyn GameRules>,
        settings: Settings,
        start: DateTime<Utc>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start));
        let sim = Arc::new(SimulatedProvider::new(snapshot, rules.clone(), clock.clone()));
        let notes = Arc::new(Recorder::default());
        let ctx = AgentContext::bootstrap(sim.clone(), rules, clock.clone(), notes.clone(), settings)
            .await
            .unwrap();
        Self {
            ctx,
            sim,
            clock,
            notes,
        }
    }

    pub fn ships_on(&self, id: u64) -> Ships {
        self.ctx.state.lock().celestial(CelestialId(id)).unwrap().ships
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.messages.lock().clone()
    }
}
