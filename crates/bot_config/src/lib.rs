//! Settings document, universe snapshots and their loaders.

mod snapshot;
mod watch;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use bot_control::{
    CargoSettings, ColonizeSettings, DefenderSettings, ExpeditionSettings, FarmSettings,
    HarvestSettings, MineSettings, RepatriateSettings, ResearchSettings,
};
use bot_core::{CheckWindow, Feature, FeatureToggles, Jitter, Mission, SleepWindow, SleepWindowError};
use serde::{Deserialize, Serialize};

pub use snapshot::{load_snapshot, validate_snapshot, UniverseSnapshot};
pub use watch::SettingsWatcher;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("setting '{0:?}' is required but absent")]
    Missing(OptionalSetting),
    #[error("invalid sleep window: {0}")]
    SleepWindow(#[from] SleepWindowError),
    #[error("check interval for {feature} has min {min_secs}s above max {max_secs}s")]
    Interval {
        feature: Feature,
        min_secs: u64,
        max_secs: u64,
    },
    #[error("fleet-save default mission must be Harvest or Spy, got {0:?}")]
    FleetSaveMission(Mission),
    #[error("snapshot is inconsistent: {0}")]
    Snapshot(String),
}

/// Sections of the document that may be left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalSetting {
    Sleep,
    Mine,
    Research,
    Cargo,
    Repatriate,
    Farm,
    Expeditions,
    Harvest,
    Colonize,
    Defender,
}

impl OptionalSetting {
    /// The section `feature` reads, if it has one.
    pub fn for_feature(feature: Feature) -> Option<Self> {
        match feature {
            Feature::Brain => None,
            Feature::Defender => Some(OptionalSetting::Defender),
            Feature::AutoMine => Some(OptionalSetting::Mine),
            Feature::AutoResearch => Some(OptionalSetting::Research),
            Feature::AutoCargo => Some(OptionalSetting::Cargo),
            Feature::AutoRepatriate => Some(OptionalSetting::Repatriate),
            Feature::AutoFarm => Some(OptionalSetting::Farm),
            Feature::Expeditions => Some(OptionalSetting::Expeditions),
            Feature::Harvest => Some(OptionalSetting::Harvest),
            Feature::Colonize => Some(OptionalSetting::Colonize),
            Feature::SleepMode => Some(OptionalSetting::Sleep),
        }
    }

    /// Sections without usable defaults.
    pub fn is_required(self) -> bool {
        matches!(self, OptionalSetting::Farm | OptionalSetting::Colonize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSettings {
    /// Local time of day, `HH:MM`.
    pub go_to_sleep: String,
    pub wake_up: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Evacuate fleets before the window starts.
    #[serde(default = "default_true")]
    pub fleet_save: bool,
    /// Evacuate only from moons.
    #[serde(default)]
    pub moons_only: bool,
}

fn default_true() -> bool {
    true
}

/// How long a fleet-save waits for returning fleets first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnWait {
    None,
    #[default]
    Celestial,
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSaveSettings {
    /// First mission tried; Harvest or Spy.
    pub default_mission: Mission,
    pub min_duration_secs: u64,
    /// Recall the fleet at half its one-way flight.
    pub recall: bool,
    pub wait_for_returns: ReturnWait,
    pub max_wait_secs: u64,
    pub poll_secs: u64,
    /// Systems either side searched for destinations.
    pub system_radius: u32,
}

impl Default for FleetSaveSettings {
    fn default() -> Self {
        Self {
            default_mission: Mission::Harvest,
            min_duration_secs: 3600,
            recall: true,
            wait_for_returns: ReturnWait::Celestial,
            max_wait_secs: 600,
            poll_secs: 30,
            system_radius: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub jitter: Jitter,
    /// Check window for features without their own entry.
    pub default_interval: CheckWindow,
    pub intervals: BTreeMap<Feature, CheckWindow>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            jitter: Jitter::default(),
            default_interval: CheckWindow {
                min_secs: 600,
                max_secs: 1200,
            },
            intervals: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Fleet slots always kept free for manual play.
    pub slot_reserve: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub features: FeatureToggles,
    pub scheduler: SchedulerSettings,
    pub dispatch: DispatchSettings,
    pub fleet_save: FleetSaveSettings,
    pub sleep: Option<SleepSettings>,
    pub mine: Option<MineSettings>,
    pub research: Option<ResearchSettings>,
    pub cargo: Option<CargoSettings>,
    pub repatriate: Option<RepatriateSettings>,
    pub farm: Option<FarmSettings>,
    pub expeditions: Option<ExpeditionSettings>,
    pub harvest: Option<HarvestSettings>,
    pub colonize: Option<ColonizeSettings>,
    pub defender: Option<DefenderSettings>,
}

impl Settings {
    pub fn is_present(&self, setting: OptionalSetting) -> bool {
        match setting {
            OptionalSetting::Sleep => self.sleep.is_some(),
            OptionalSetting::Mine => self.mine.is_some(),
            OptionalSetting::Research => self.research.is_some(),
            OptionalSetting::Cargo => self.cargo.is_some(),
            OptionalSetting::Repatriate => self.repatriate.is_some(),
            OptionalSetting::Farm => self.farm.is_some(),
            OptionalSetting::Expeditions => self.expeditions.is_some(),
            OptionalSetting::Harvest => self.harvest.is_some(),
            OptionalSetting::Colonize => self.colonize.is_some(),
            OptionalSetting::Defender => self.defender.is_some(),
        }
    }

    /// Switched-on features whose section is left out.
    pub fn unconfigured(&self) -> Vec<(Feature, OptionalSetting)> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.features.is_active(*f))
            .filter_map(|f| OptionalSetting::for_feature(f).map(|s| (f, s)))
            .filter(|(_, s)| !self.is_present(*s))
            .collect()
    }

    pub fn toggles(&self) -> FeatureToggles {
        self.features
    }

    /// The configured window; `Ok(None)` when sleep mode is not configured.
    pub fn sleep_window(&self) -> Result<Option<SleepWindow>, ConfigError> {
        let Some(sleep) = &self.sleep else {
            return Ok(None);
        };
        let window =
            SleepWindow::parse(&sleep.go_to_sleep, &sleep.wake_up, sleep.utc_offset_minutes)?;
        Ok(Some(window))
    }

    pub fn check_window(&self, feature: Feature) -> CheckWindow {
        if let Some(window) = self.scheduler.intervals.get(&feature) {
            return *window;
        }
        match feature {
            Feature::Defender => CheckWindow {
                min_secs: 60,
                max_secs: 180,
            },
            Feature::SleepMode => CheckWindow {
                min_secs: 60,
                max_secs: 120,
            },
            _ => self.scheduler.default_interval,
        }
    }

    /// Farming and colonizing act on other players' slots and need an
    /// explicit section; every other feature runs on defaults.
    pub fn farm(&self) -> Result<&FarmSettings, ConfigError> {
        self.farm
            .as_ref()
            .ok_or(ConfigError::Missing(OptionalSetting::Farm))
    }

    pub fn colonize(&self) -> Result<&ColonizeSettings, ConfigError> {
        self.colonize
            .as_ref()
            .ok_or(ConfigError::Missing(OptionalSetting::Colonize))
    }

    pub fn mine(&self) -> MineSettings {
        self.mine.clone().unwrap_or_default()
    }

    pub fn research(&self) -> ResearchSettings {
        self.research.clone().unwrap_or_default()
    }

    pub fn cargo(&self) -> CargoSettings {
        self.cargo.clone().unwrap_or_default()
    }

    pub fn repatriate(&self) -> RepatriateSettings {
        self.repatriate.clone().unwrap_or_default()
    }

    pub fn expeditions(&self) -> ExpeditionSettings {
        self.expeditions.clone().unwrap_or_default()
    }

    pub fn harvest(&self) -> HarvestSettings {
        self.harvest.clone().unwrap_or_default()
    }

    pub fn defender(&self) -> DefenderSettings {
        self.defender.clone().unwrap_or_default()
    }
}

/// Cross-field checks serde cannot express.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    for feature in Feature::ALL {
        let window = settings.check_window(feature);
        if window.min_secs > window.max_secs {
            return Err(ConfigError::Interval {
                feature,
                min_secs: window.min_secs,
                max_secs: window.max_secs,
            });
        }
    }
    let mission = settings.fleet_save.default_mission;
    if !matches!(mission, Mission::Harvest | Mission::Spy) {
        return Err(ConfigError::FleetSaveMission(mission));
    }
    Ok(())
}

pub fn parse_settings(raw: &str) -> Result<Settings> {
    let settings: Settings = serde_json::from_str(raw).context("parsing settings")?;
    validate_settings(&settings).context("validating settings")?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_settings(&raw).with_context(|| format!("loading {}", path.display()))
}
