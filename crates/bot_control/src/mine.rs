//! AutoMine: pick the next building for one celestial.

use bot_core::{
    level_of, Buildable, Celestial, ExchangeRatio, FlightContext, GameRules, Resources,
};
use serde::{Deserialize, Serialize};

use crate::Plan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineSettings {
    pub max_metal_mine: u32,
    pub max_crystal_mine: u32,
    pub max_deuterium_synthesizer: u32,
    pub max_solar_plant: u32,
    pub max_storage: u32,
    pub max_robotics_factory: u32,
    pub max_shipyard: u32,
    pub max_research_lab: u32,
    pub max_nanite_factory: u32,
    /// Fill ratio at which a storage upgrade takes priority.
    pub storage_threshold: f64,
    pub ratio: ExchangeRatio,
}

impl Default for MineSettings {
    fn default() -> Self {
        Self {
            max_metal_mine: 30,
            max_crystal_mine: 26,
            max_deuterium_synthesizer: 24,
            max_solar_plant: 30,
            max_storage: 12,
            max_robotics_factory: 10,
            max_shipyard: 8,
            max_research_lab: 10,
            max_nanite_factory: 3,
            storage_threshold: 0.9,
            ratio: ExchangeRatio::default(),
        }
    }
}

impl MineSettings {
    fn max_level(&self, buildable: Buildable) -> u32 {
        match buildable {
            Buildable::MetalMine => self.max_metal_mine,
            Buildable::CrystalMine => self.max_crystal_mine,
            Buildable::DeuteriumSynthesizer => self.max_deuterium_synthesizer,
            Buildable::SolarPlant => self.max_solar_plant,
            Buildable::MetalStorage | Buildable::CrystalStorage | Buildable::DeuteriumTank => {
                self.max_storage
            }
            Buildable::RoboticsFactory => self.max_robotics_factory,
            Buildable::Shipyard => self.max_shipyard,
            Buildable::ResearchLab => self.max_research_lab,
            Buildable::NaniteFactory => self.max_nanite_factory,
            _ => 0,
        }
    }
}

/// A building upgrade to `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOrder {
    pub buildable: Buildable,
    pub level: u32,
    pub cost: Resources,
}

const FACILITIES: [Buildable; 4] = [
    Buildable::RoboticsFactory,
    Buildable::Shipyard,
    Buildable::ResearchLab,
    Buildable::NaniteFactory,
];

fn next_level(celestial: &Celestial, buildable: Buildable) -> u32 {
    level_of(&celestial.buildings, &celestial.facilities, buildable) + 1
}

fn below_max(celestial: &Celestial, buildable: Buildable, settings: &MineSettings) -> bool {
    next_level(celestial, buildable) <= settings.max_level(buildable)
}

fn storage_pressure(
    rules: &dyn GameRules,
    celestial: &Celestial,
    settings: &MineSettings,
) -> Option<Buildable> {
    let b = &celestial.buildings;
    let threshold = settings.storage_threshold;
    [
        (celestial.resources.metal, b.metal_storage, Buildable::MetalStorage),
        (celestial.resources.crystal, b.crystal_storage, Buildable::CrystalStorage),
        (celestial.resources.deuterium, b.deuterium_tank, Buildable::DeuteriumTank),
    ]
    .into_iter()
    .find(|(stock, level, storage)| {
        let capacity = rules.storage_capacity(*level) as f64;
        *stock as f64 >= capacity * threshold && below_max(celestial, *storage, settings)
    })
    .map(|(_, _, storage)| storage)
}

fn choose(
    rules: &dyn GameRules,
    ctx: &FlightContext<'_>,
    celestial: &Celestial,
    settings: &MineSettings,
) -> Option<Buildable> {
    let energy = rules.energy_balance(&celestial.buildings, &celestial.temperature, ctx.researches);
    if energy < 0 && below_max(celestial, Buildable::SolarPlant, settings) {
        return Some(Buildable::SolarPlant);
    }
    if let Some(storage) = storage_pressure(rules, celestial, settings) {
        return Some(storage);
    }

    let value = |b: Buildable| {
        rules
            .building_cost(b, next_level(celestial, b))
            .conversion_value(&settings.ratio)
    };
    let mine = Buildable::MINES
        .into_iter()
        .filter(|b| below_max(celestial, *b, settings))
        .map(|b| {
            let days = rules.days_of_investment_return(
                celestial,
                b,
                ctx.universe,
                ctx.researches,
                ctx.class,
                &settings.ratio,
            );
            (b, days)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(b, _)| b);

    let facility = FACILITIES
        .into_iter()
        .filter(|b| below_max(celestial, *b, settings))
        .filter(|b| *b != Buildable::NaniteFactory || celestial.facilities.robotics_factory >= 10)
        .min_by(|a, b| value(*a).total_cmp(&value(*b)));

    match (mine, facility) {
        (Some(m), Some(f)) if value(f) < value(m) => Some(f),
        (Some(m), _) => Some(m),
        (None, f) => f,
    }
}

/// Next upgrade for `celestial`. Waits on a running construction or on
/// production to cover the cost.
pub fn plan_mine(
    rules: &dyn GameRules,
    ctx: &FlightContext<'_>,
    celestial: &Celestial,
    settings: &MineSettings,
) -> Plan<BuildOrder> {
    if let Some((_, remaining)) = celestial.constructions.building {
        return Plan::Wait(remaining);
    }
    if celestial.is_moon() || celestial.fields.is_full() {
        return Plan::Idle;
    }
    let Some(buildable) = choose(rules, ctx, celestial, settings) else {
        return Plan::Idle;
    };
    let level = next_level(celestial, buildable);
    let cost = rules.building_cost(buildable, level);
    if celestial.resources.is_enough_for(&cost) {
        return Plan::Act(BuildOrder {
            buildable,
            level,
            cost,
        });
    }
    match celestial.production.seconds_until(&celestial.resources, &cost) {
        Some(secs) => Plan::Wait(secs.max(1)),
        None => Plan::Idle,
    }
}
