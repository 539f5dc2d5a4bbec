//! Farm target pipeline: scan → probe → report → attack.
//!
//! The table holds exactly one target per coordinate. State only moves
//! through the methods below; garbage collection is the single way back to
//! `ProbesPending`, and never for a target with a raid still on its way.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::resources::{ExchangeRatio, Resources};
use crate::types::{Coordinate, EspionageReport, GalaxySlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FarmState {
    Idle,
    ProbesPending,
    ProbesSent,
    ProbesRequired,
    FailedProbesRequired,
    NotSuitable,
    AttackPending,
    AttackSent,
}

impl FarmState {
    /// States that want a probe wave next.
    pub fn needs_probes(self) -> bool {
        matches!(
            self,
            FarmState::ProbesPending | FarmState::ProbesRequired | FarmState::FailedProbesRequired
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmTarget {
    pub coordinate: Coordinate,
    /// Last scanned snapshot of the position.
    pub slot: GalaxySlot,
    pub state: FarmState,
    pub report: Option<EspionageReport>,
    /// Incomplete reports received since the last reset.
    pub escalations: u32,
    /// When the last probe wave left.
    #[serde(default)]
    pub probes_sent_at: Option<DateTime<Utc>>,
}

impl FarmTarget {
    /// Probes for the next wave; each escalation triples the count.
    pub fn probes_needed(&self, base: u64) -> u64 {
        base.max(1) * 3u64.pow(self.escalations.min(10))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FarmError {
    #[error("no farm target at {0}")]
    UnknownTarget(Coordinate),
    #[error("report for {coordinate} arrived while target was {state:?}")]
    UnexpectedReport {
        coordinate: Coordinate,
        state: FarmState,
    },
}

/// Thresholds applied when a report comes in.
#[derive(Debug, Clone, Copy)]
pub struct ReportPolicy {
    /// Minimum loot, in metal units, worth a raid.
    pub min_loot: u64,
    pub ratio: ExchangeRatio,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmTable {
    targets: BTreeMap<Coordinate, FarmTarget>,
}

impl FarmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&FarmTarget> {
        self.targets.get(coordinate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FarmTarget> {
        self.targets.values()
    }

    pub fn in_state(&self, state: FarmState) -> Vec<&FarmTarget> {
        self.targets.values().filter(|t| t.state == state).collect()
    }

    /// Record a scanned position. The snapshot is always overwritten; the
    /// state is kept unless it was `Idle`, which is promoted.
    pub fn observe(&mut self, slot: GalaxySlot) {
        let coordinate = slot.coordinate;
        match self.targets.get_mut(&coordinate) {
            Some(target) => {
                target.slot = slot;
                if target.state == FarmState::Idle {
                    target.state = FarmState::ProbesPending;
                }
            }
            None => {
                self.targets.insert(
                    coordinate,
                    FarmTarget {
                        coordinate,
                        slot,
                        state: FarmState::Idle,
                        report: None,
                        escalations: 0,
                        probes_sent_at: None,
                    },
                );
            }
        }
    }

    /// Replace the table's view of a fully scanned range: positions in range
    /// but absent from `slots` are dropped, the rest observed.
    pub fn sync_range(&mut self, in_range: impl Fn(&Coordinate) -> bool, slots: Vec<GalaxySlot>) {
        let seen: Vec<Coordinate> = slots.iter().map(|s| s.coordinate).collect();
        self.targets
            .retain(|coordinate, _| !in_range(coordinate) || seen.contains(coordinate));
        for slot in slots {
            self.observe(slot);
        }
    }

    pub fn mark_probes_sent(
        &mut self,
        coordinate: &Coordinate,
        now: DateTime<Utc>,
    ) -> Result<(), FarmError> {
        let target = self
            .targets
            .get_mut(coordinate)
            .ok_or(FarmError::UnknownTarget(*coordinate))?;
        target.state = FarmState::ProbesSent;
        target.probes_sent_at = Some(now);
        Ok(())
    }

    /// Classify a fresh espionage report. Incomplete intel escalates
    /// ProbesRequired → FailedProbesRequired → NotSuitable.
    pub fn apply_report(
        &mut self,
        report: EspionageReport,
        policy: &ReportPolicy,
    ) -> Result<FarmState, FarmError> {
        let coordinate = report.coordinate;
        let target = self
            .targets
            .get_mut(&coordinate)
            .ok_or(FarmError::UnknownTarget(coordinate))?;
        if matches!(
            target.state,
            FarmState::Idle | FarmState::NotSuitable | FarmState::AttackSent
        ) {
            return Err(FarmError::UnexpectedReport {
                coordinate,
                state: target.state,
            });
        }

        target.state = if report.is_complete() {
            let loot = report.loot().conversion_value(&policy.ratio);
            if loot < policy.min_loot as f64 {
                FarmState::NotSuitable
            } else if report.is_defenceless() {
                FarmState::AttackPending
            } else {
                FarmState::NotSuitable
            }
        } else {
            target.escalations += 1;
            match target.escalations {
                1 => FarmState::ProbesRequired,
                2 => FarmState::FailedProbesRequired,
                _ => FarmState::NotSuitable,
            }
        };
        target.report = Some(report);
        Ok(target.state)
    }

    pub fn mark_attack_sent(&mut self, coordinate: &Coordinate) -> Result<(), FarmError> {
        let target = self
            .targets
            .get_mut(coordinate)
            .ok_or(FarmError::UnknownTarget(*coordinate))?;
        target.state = FarmState::AttackSent;
        Ok(())
    }

    /// Reset targets whose intel is stale, whose probes never reported
    /// back, or whose raid has landed. Targets in `raiding` (an attack is
    /// still outbound) are left alone. Returns how many were reset.
    pub fn collect_garbage(
        &mut self,
        now: DateTime<Utc>,
        retention: Duration,
        raiding: &[Coordinate],
    ) -> usize {
        let mut reset = 0;
        for target in self.targets.values_mut() {
            if raiding.contains(&target.coordinate) {
                continue;
            }
            let stale = target
                .report
                .as_ref()
                .is_some_and(|r| now - r.timestamp > retention);
            let lost_probes = target.state == FarmState::ProbesSent
                && target.probes_sent_at.is_some_and(|sent| now - sent > retention);
            if stale || lost_probes || target.state == FarmState::AttackSent {
                target.state = FarmState::ProbesPending;
                target.report = None;
                target.escalations = 0;
                target.probes_sent_at = None;
                reset += 1;
            }
        }
        reset
    }

    /// Attack-ready targets, richest first.
    pub fn attack_queue(&self, ratio: &ExchangeRatio) -> Vec<(Coordinate, Resources)> {
        let mut ready: Vec<(Coordinate, Resources)> = self
            .targets
            .values()
            .filter(|t| t.state == FarmState::AttackPending)
            .filter_map(|t| t.report.as_ref().map(|r| (t.coordinate, r.loot())))
            .collect();
        ready.sort_by(|a, b| {
            b.1.conversion_value(ratio)
                .total_cmp(&a.1.conversion_value(ratio))
                .then(a.0.cmp(&b.0))
        });
        ready
    }

    /// Targets waiting on a probe wave, with the probe count each needs.
    pub fn probe_queue(&self, base_probes: u64) -> Vec<(Coordinate, u64)> {
        self.targets
            .values()
            .filter(|t| t.state.needs_probes())
            .map(|t| (t.coordinate, t.probes_needed(base_probes)))
            .collect()
    }
}
