//! AutoResearch: cheapest unfinished research target on the lab celestial.

use bot_core::{
    Celestial, CelestialId, ExchangeRatio, GameRules, ResearchType, Researches, Resources,
    UniverseInfo,
};
use serde::{Deserialize, Serialize};

use crate::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchTarget {
    pub research: ResearchType,
    pub max_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    /// Celestial whose lab runs research; the best lab when unset.
    pub lab: Option<CelestialId>,
    pub targets: Vec<ResearchTarget>,
    pub ratio: ExchangeRatio,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            lab: None,
            targets: vec![
                ResearchTarget {
                    research: ResearchType::EnergyTechnology,
                    max_level: 12,
                },
                ResearchTarget {
                    research: ResearchType::CombustionDrive,
                    max_level: 10,
                },
                ResearchTarget {
                    research: ResearchType::ImpulseDrive,
                    max_level: 8,
                },
                ResearchTarget {
                    research: ResearchType::Astrophysics,
                    max_level: 9,
                },
                ResearchTarget {
                    research: ResearchType::PlasmaTechnology,
                    max_level: 10,
                },
            ],
            ratio: ExchangeRatio::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchOrder {
    pub celestial: CelestialId,
    pub research: ResearchType,
    pub level: u32,
    pub cost: Resources,
    pub duration_secs: u64,
}

/// The configured lab, or the planet with the highest lab level.
pub fn research_lab<'a>(
    celestials: &'a [Celestial],
    configured: Option<CelestialId>,
) -> Option<&'a Celestial> {
    if let Some(id) = configured {
        return celestials.iter().find(|c| c.id == id);
    }
    celestials
        .iter()
        .filter(|c| !c.is_moon() && c.facilities.research_lab > 0)
        .max_by_key(|c| (c.facilities.research_lab, std::cmp::Reverse(c.id)))
}

/// Next research to start on `lab`. Any running research anywhere on the
/// account blocks the queue.
pub fn plan_research(
    rules: &dyn GameRules,
    universe: &UniverseInfo,
    researches: &Researches,
    celestials: &[Celestial],
    lab: &Celestial,
    settings: &ResearchSettings,
) -> Plan<ResearchOrder> {
    let running = celestials
        .iter()
        .filter_map(|c| c.constructions.research.map(|(_, secs)| secs))
        .max();
    if let Some(remaining) = running {
        return Plan::Wait(remaining);
    }

    let cheapest = settings
        .targets
        .iter()
        .filter(|t| researches.level(t.research) < t.max_level)
        .map(|t| {
            let level = researches.level(t.research) + 1;
            (t.research, level, rules.research_cost(t.research, level))
        })
        .min_by(|a, b| {
            a.2.conversion_value(&settings.ratio)
                .total_cmp(&b.2.conversion_value(&settings.ratio))
        });
    let Some((research, level, cost)) = cheapest else {
        return Plan::Idle;
    };

    if lab.resources.is_enough_for(&cost) {
        return Plan::Act(ResearchOrder {
            celestial: lab.id,
            research,
            level,
            cost,
            duration_secs: rules.research_time(
                research,
                level,
                lab.facilities.research_lab,
                universe,
            ),
        });
    }
    match lab.production.seconds_until(&lab.resources, &cost) {
        Some(secs) => Plan::Wait(secs.max(1)),
        None => Plan::Idle,
    }
}
