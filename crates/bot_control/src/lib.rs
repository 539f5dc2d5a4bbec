//! Per-feature planners.
//!
//! Each module turns a snapshot of account state plus its settings into the
//! next action for one job. Nothing here talks to the provider or reads a
//! clock; the daemon's job handlers feed state in and carry plans out.

pub mod cargo;
pub mod colonize;
pub mod defender;
pub mod expedition;
pub mod farm;
pub mod harvest;
pub mod mine;
pub mod repatriate;
pub mod research;

pub use cargo::{plan_cargo, CargoSettings, ShipOrder};
pub use colonize::{plan_colonization, ColonizePlan, ColonizeSettings, ColonizeSkip};
pub use defender::{threats, DefenderSettings, Threat};
pub use expedition::{expedition_origin, expedition_target, plan_expeditions, ExpeditionSettings};
pub use farm::{plan_attacks, plan_probe_waves, FarmSettings};
pub use harvest::{plan_harvests, HarvestPlan, HarvestSettings};
pub use mine::{plan_mine, BuildOrder, MineSettings};
pub use repatriate::{plan_repatriation, RepatriateSettings, TransferPlan};
pub use research::{plan_research, research_lab, ResearchOrder, ResearchSettings, ResearchTarget};

/// What a planner wants done next.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan<T> {
    Act(T),
    /// Nothing can happen for this many seconds.
    Wait(u64),
    /// Nothing to do; the caller falls back to its check interval.
    Idle,
}

impl<T> Plan<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Plan::Idle)
    }
}

/// Whole ships of capacity `per_ship` needed to carry `amount`.
pub(crate) fn ships_for(amount: u64, per_ship: u64) -> u64 {
    if per_ship == 0 {
        return 0;
    }
    amount.div_ceil(per_ship)
}
