//! Sleep gate decisions: when to fall asleep, when to defer, when to wake.

use bot_core::{Celestial, CelestialId, Fleet, GameRules, SleepPhase, SleepWindow, Ships};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepStep {
    StayAwake { sleep_at: DateTime<Utc> },
    /// The window started but a fleet lands inside it; look again at `until`.
    Defer { until: DateTime<Utc> },
    FallAsleep { wake_at: DateTime<Utc> },
    StayAsleep { wake_at: DateTime<Utc> },
    WakeUp { sleep_at: DateTime<Utc> },
}

impl SleepStep {
    /// Next moment the gate needs to look again.
    pub fn next_check(&self) -> DateTime<Utc> {
        match *self {
            SleepStep::StayAwake { sleep_at } | SleepStep::WakeUp { sleep_at } => sleep_at,
            SleepStep::Defer { until } => until,
            SleepStep::FallAsleep { wake_at } | SleepStep::StayAsleep { wake_at } => wake_at,
        }
    }
}

/// Last moment one of `fleets` lands strictly between `now` and `wake_at`:
/// a return home, or the arrival of a one-way deploy.
pub fn last_landing_before(
    fleets: &[Fleet],
    now: DateTime<Utc>,
    wake_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    fleets
        .iter()
        .map(Fleet::home_time)
        .filter(|t| *t > now && *t < wake_at)
        .max()
}

pub fn next_step(
    window: &SleepWindow,
    now: DateTime<Utc>,
    asleep: bool,
    fleets: &[Fleet],
) -> SleepStep {
    match (window.phase(now), asleep) {
        (SleepPhase::Asleep { wake_at }, false) => match last_landing_before(fleets, now, wake_at) {
            Some(until) => SleepStep::Defer { until },
            None => SleepStep::FallAsleep { wake_at },
        },
        (SleepPhase::Asleep { wake_at }, true) => SleepStep::StayAsleep { wake_at },
        (SleepPhase::Awake { sleep_at }, true) => SleepStep::WakeUp { sleep_at },
        (SleepPhase::Awake { sleep_at }, false) => SleepStep::StayAwake { sleep_at },
    }
}

/// Summed construction cost of the ships, in resource units.
pub fn fleet_value(rules: &dyn GameRules, ships: &Ships) -> u64 {
    ships
        .movable()
        .iter()
        .map(|(ship, count)| rules.ship_cost(ship).total().saturating_mul(count))
        .sum()
}

/// Celestials with something to evacuate, most valuable fleet first.
pub fn evacuation_order(
    rules: &dyn GameRules,
    celestials: &[Celestial],
    moons_only: bool,
) -> Vec<CelestialId> {
    let mut ranked: Vec<(u64, CelestialId)> = celestials
        .iter()
        .filter(|c| !moons_only || c.is_moon())
        .filter(|c| c.ships.has_movable_fleet())
        .map(|c| (fleet_value(rules, &c.ships), c.id))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().map(|(_, id)| id).collect()
}
