//! Defender: which hostile events need a reaction.

use bot_core::{Celestial, CelestialId, Coordinate, HostileEvent, Mission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderSettings {
    pub ignore_probes: bool,
    /// Attackers never reacted to, e.g. alliance mates testing.
    pub ignore_origins: Vec<Coordinate>,
    /// Extra seconds added to the fleet-save minimum beyond the impact.
    pub safety_margin_secs: u64,
    pub notify: bool,
}

impl Default for DefenderSettings {
    fn default() -> Self {
        Self {
            ignore_probes: true,
            ignore_origins: Vec::new(),
            safety_margin_secs: 600,
            notify: true,
        }
    }
}

/// An attacked celestial and the earliest impact on it.
#[derive(Debug, Clone)]
pub struct Threat {
    pub celestial: CelestialId,
    pub coordinate: Coordinate,
    pub arrival: DateTime<Utc>,
    pub events: Vec<HostileEvent>,
}

impl Threat {
    /// Seconds a fleet-save must last to be away past the impact.
    pub fn min_save_secs(&self, now: DateTime<Utc>, settings: &DefenderSettings) -> u64 {
        let until = (self.arrival - now).num_seconds().max(0);
        u64::try_from(until).unwrap_or(0) + settings.safety_margin_secs
    }
}

fn hostile(event: &HostileEvent, settings: &DefenderSettings) -> bool {
    if !matches!(event.mission, Mission::Attack | Mission::Spy) {
        return false;
    }
    if settings.ignore_probes && (event.mission == Mission::Spy || event.is_probe_only()) {
        return false;
    }
    !settings.ignore_origins.iter().any(|o| *o == event.origin)
}

/// Group relevant events by target, soonest impact first.
pub fn threats(
    events: &[HostileEvent],
    own: &[Celestial],
    settings: &DefenderSettings,
) -> Vec<Threat> {
    let mut out: Vec<Threat> = Vec::new();
    for event in events.iter().filter(|e| hostile(e, settings)) {
        let Some(target) = own.iter().find(|c| c.coordinate == event.destination) else {
            continue;
        };
        match out.iter_mut().find(|t| t.celestial == target.id) {
            Some(threat) => {
                threat.arrival = threat.arrival.min(event.arrival_time);
                threat.events.push(event.clone());
            }
            None => out.push(Threat {
                celestial: target.id,
                coordinate: target.coordinate,
                arrival: event.arrival_time,
                events: vec![event.clone()],
            }),
        }
    }
    out.sort_by_key(|t| t.arrival);
    out
}
