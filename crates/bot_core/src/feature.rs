//! Features and the pure enable/disable decision.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Defender,
    /// Parent switch of the brain sub-features; never runs itself.
    Brain,
    AutoMine,
    AutoResearch,
    AutoCargo,
    AutoRepatriate,
    AutoFarm,
    Expeditions,
    Harvest,
    Colonize,
    SleepMode,
}

impl Feature {
    pub const ALL: [Feature; 11] = [
        Feature::Defender,
        Feature::Brain,
        Feature::AutoMine,
        Feature::AutoResearch,
        Feature::AutoCargo,
        Feature::AutoRepatriate,
        Feature::AutoFarm,
        Feature::Expeditions,
        Feature::Harvest,
        Feature::Colonize,
        Feature::SleepMode,
    ];

    pub fn parent(self) -> Option<Feature> {
        match self {
            Feature::AutoMine
            | Feature::AutoResearch
            | Feature::AutoCargo
            | Feature::AutoRepatriate => Some(Feature::Brain),
            _ => None,
        }
    }

    /// Schedulable features; `Brain` only gates its children.
    pub fn is_job(self) -> bool {
        self != Feature::Brain
    }

    /// Spends resources or moves fleets for profit; paused while asleep.
    pub fn spends_resources(self) -> bool {
        !matches!(
            self,
            Feature::Defender | Feature::SleepMode | Feature::Brain
        )
    }

    /// May move fleets or resources; member of the shared exclusion group.
    pub fn moves_assets(self) -> bool {
        matches!(
            self,
            Feature::Defender
                | Feature::AutoMine
                | Feature::AutoRepatriate
                | Feature::AutoFarm
                | Feature::Expeditions
                | Feature::Harvest
                | Feature::Colonize
        )
    }

    /// Runs one independently re-armed instance per celestial.
    pub fn per_celestial(self) -> bool {
        matches!(self, Feature::AutoMine | Feature::AutoCargo)
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Defender => "defender",
            Feature::Brain => "brain",
            Feature::AutoMine => "auto_mine",
            Feature::AutoResearch => "auto_research",
            Feature::AutoCargo => "auto_cargo",
            Feature::AutoRepatriate => "auto_repatriate",
            Feature::AutoFarm => "auto_farm",
            Feature::Expeditions => "expeditions",
            Feature::Harvest => "harvest",
            Feature::Colonize => "colonize",
            Feature::SleepMode => "sleep_mode",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured active flag per feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub defender: bool,
    pub brain: bool,
    pub auto_mine: bool,
    pub auto_research: bool,
    pub auto_cargo: bool,
    pub auto_repatriate: bool,
    pub auto_farm: bool,
    pub expeditions: bool,
    pub harvest: bool,
    pub colonize: bool,
    pub sleep_mode: bool,
}

impl FeatureToggles {
    pub fn is_active(&self, feature: Feature) -> bool {
        match feature {
            Feature::Defender => self.defender,
            Feature::Brain => self.brain,
            Feature::AutoMine => self.auto_mine,
            Feature::AutoResearch => self.auto_research,
            Feature::AutoCargo => self.auto_cargo,
            Feature::AutoRepatriate => self.auto_repatriate,
            Feature::AutoFarm => self.auto_farm,
            Feature::Expeditions => self.expeditions,
            Feature::Harvest => self.harvest,
            Feature::Colonize => self.colonize,
            Feature::SleepMode => self.sleep_mode,
        }
    }
}

/// Desired running state of `feature`. Asleep forces every
/// resource-spending feature off; otherwise the feature and its parent must
/// both be active.
pub fn evaluate(feature: Feature, toggles: &FeatureToggles, asleep: bool) -> bool {
    if !feature.is_job() {
        return false;
    }
    if asleep && feature.spends_resources() {
        return false;
    }
    let parent_active = feature.parent().is_none_or(|p| toggles.is_active(p));
    parent_active && toggles.is_active(feature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> FeatureToggles {
        FeatureToggles {
            defender: true,
            brain: true,
            auto_mine: true,
            auto_research: true,
            auto_cargo: true,
            auto_repatriate: true,
            auto_farm: true,
            expeditions: true,
            harvest: true,
            colonize: true,
            sleep_mode: true,
        }
    }

    #[test]
    fn asleep_disables_spenders_only() {
        let toggles = all_on();
        for feature in Feature::ALL.into_iter().filter(|f| f.is_job()) {
            let expected = !feature.spends_resources();
            assert_eq!(evaluate(feature, &toggles, true), expected, "{feature}");
            assert!(evaluate(feature, &toggles, false), "{feature}");
        }
    }

    #[test]
    fn sub_feature_needs_parent() {
        let mut toggles = all_on();
        toggles.brain = false;
        assert!(!evaluate(Feature::AutoMine, &toggles, false));
        assert!(!evaluate(Feature::AutoRepatriate, &toggles, false));
        assert!(evaluate(Feature::AutoFarm, &toggles, false));
    }

    #[test]
    fn brain_is_never_scheduled() {
        assert!(!evaluate(Feature::Brain, &all_on(), false));
    }
}
