//! Account snapshot used to seed the simulated provider.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use bot_core::{
    Celestial, EspionageReport, Fleet, GalaxySlot, HostileEvent, PlayerClass, Researches, Slots,
    UniverseInfo,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseSnapshot {
    pub universe: UniverseInfo,
    #[serde(default)]
    pub class: PlayerClass,
    #[serde(default)]
    pub researches: Researches,
    pub celestials: Vec<Celestial>,
    #[serde(default)]
    pub fleets: Vec<Fleet>,
    pub slots: Slots,
    /// Known galaxy positions, returned by system scans.
    #[serde(default)]
    pub galaxy: Vec<GalaxySlot>,
    /// Reports handed out once probes reach their target.
    #[serde(default)]
    pub reports: Vec<EspionageReport>,
    #[serde(default)]
    pub hostile: Vec<HostileEvent>,
}

/// Cross-reference checks: unique ids and coordinates inside the universe.
pub fn validate_snapshot(snapshot: &UniverseSnapshot) -> Result<(), ConfigError> {
    let u = &snapshot.universe;
    let mut ids = HashSet::new();
    for celestial in &snapshot.celestials {
        if !ids.insert(celestial.id) {
            return Err(ConfigError::Snapshot(format!(
                "celestial id {} appears twice",
                celestial.id
            )));
        }
        let c = celestial.coordinate;
        if c.galaxy == 0 || c.galaxy > u.galaxies || c.system == 0 || c.system > u.systems {
            return Err(ConfigError::Snapshot(format!(
                "celestial '{}' at {c} lies outside the universe",
                celestial.name
            )));
        }
    }
    if snapshot.slots.in_use > snapshot.slots.total {
        return Err(ConfigError::Snapshot(format!(
            "{} slots in use but only {} exist",
            snapshot.slots.in_use, snapshot.slots.total
        )));
    }
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<UniverseSnapshot> {
    let snapshot: UniverseSnapshot = serde_json::from_str(
        &std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    validate_snapshot(&snapshot).with_context(|| format!("validating {}", path.display()))?;
    Ok(snapshot)
}
