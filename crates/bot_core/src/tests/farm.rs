use super::*;
use crate::test_fixtures::{at, inactive_slot, report};
use chrono::Duration;

fn target() -> Coordinate {
    Coordinate::planet(1, 105, 6)
}

fn policy() -> ReportPolicy {
    ReportPolicy {
        min_loot: 10_000,
        ratio: ExchangeRatio::default(),
    }
}

fn rich() -> Resources {
    Resources::new(200_000, 100_000, 50_000)
}

fn table_with_pending(coordinate: Coordinate) -> FarmTable {
    let mut table = FarmTable::new();
    table.observe(inactive_slot(coordinate));
    table.observe(inactive_slot(coordinate));
    table
}

#[test]
fn first_scan_is_idle_second_promotes() {
    let mut table = FarmTable::new();
    table.observe(inactive_slot(target()));
    assert_eq!(table.get(&target()).unwrap().state, FarmState::Idle);
    table.observe(inactive_slot(target()));
    assert_eq!(table.get(&target()).unwrap().state, FarmState::ProbesPending);
    assert_eq!(table.len(), 1);
}

#[test]
fn incomplete_reports_escalate_to_not_suitable() {
    let mut table = FarmTable::new();
    let mut seen = Vec::new();

    table.observe(inactive_slot(target()));
    seen.push(table.get(&target()).unwrap().state);
    table.observe(inactive_slot(target()));
    seen.push(table.get(&target()).unwrap().state);

    for hour in 0..3 {
        table.mark_probes_sent(&target(), at(9, 0)).unwrap();
        seen.push(table.get(&target()).unwrap().state);
        let state = table
            .apply_report(report(target(), at(10 + hour, 0), rich(), false), &policy())
            .unwrap();
        seen.push(state);
        // rescans in between must not reset progress
        table.observe(inactive_slot(target()));
        assert_eq!(table.get(&target()).unwrap().state, state);
    }

    assert_eq!(
        seen,
        vec![
            FarmState::Idle,
            FarmState::ProbesPending,
            FarmState::ProbesSent,
            FarmState::ProbesRequired,
            FarmState::ProbesSent,
            FarmState::FailedProbesRequired,
            FarmState::ProbesSent,
            FarmState::NotSuitable,
        ]
    );
    assert_eq!(
        seen.iter()
            .filter(|s| **s == FarmState::ProbesPending)
            .count(),
        1
    );

    let late = table.apply_report(report(target(), at(14, 0), rich(), true), &policy());
    assert_eq!(
        late,
        Err(FarmError::UnexpectedReport {
            coordinate: target(),
            state: FarmState::NotSuitable,
        })
    );
}

#[test]
fn probe_waves_triple_per_escalation() {
    let mut table = table_with_pending(target());
    assert_eq!(table.probe_queue(2), vec![(target(), 2)]);

    table.mark_probes_sent(&target(), at(9, 0)).unwrap();
    assert!(table.probe_queue(2).is_empty());
    table
        .apply_report(report(target(), at(10, 0), rich(), false), &policy())
        .unwrap();
    assert_eq!(table.probe_queue(2), vec![(target(), 6)]);

    table.mark_probes_sent(&target(), at(9, 0)).unwrap();
    table
        .apply_report(report(target(), at(11, 0), rich(), false), &policy())
        .unwrap();
    assert_eq!(table.probe_queue(2), vec![(target(), 18)]);
}

#[test]
fn complete_reports_are_classified() {
    let defended = Coordinate::planet(1, 106, 2);
    let poor = Coordinate::planet(1, 107, 3);
    let mut table = table_with_pending(target());
    table.observe(inactive_slot(defended));
    table.observe(inactive_slot(defended));
    table.observe(inactive_slot(poor));
    table.observe(inactive_slot(poor));

    let state = table
        .apply_report(report(target(), at(9, 0), rich(), true), &policy())
        .unwrap();
    assert_eq!(state, FarmState::AttackPending);

    let mut guarded = report(defended, at(9, 0), rich(), true);
    guarded.defence_units = Some(40);
    assert_eq!(
        table.apply_report(guarded, &policy()).unwrap(),
        FarmState::NotSuitable
    );

    let scraps = report(poor, at(9, 0), Resources::new(1000, 500, 0), true);
    assert_eq!(
        table.apply_report(scraps, &policy()).unwrap(),
        FarmState::NotSuitable
    );
}

#[test]
fn reports_in_idle_are_rejected() {
    let mut table = FarmTable::new();
    table.observe(inactive_slot(target()));
    assert!(matches!(
        table.apply_report(report(target(), at(9, 0), rich(), true), &policy()),
        Err(FarmError::UnexpectedReport {
            state: FarmState::Idle,
            ..
        })
    ));
    let unknown = Coordinate::planet(2, 2, 2);
    assert_eq!(
        table.apply_report(report(unknown, at(9, 0), rich(), true), &policy()),
        Err(FarmError::UnknownTarget(unknown))
    );
}

#[test]
fn attack_queue_is_richest_first() {
    let modest = Coordinate::planet(1, 110, 1);
    let mut table = table_with_pending(target());
    table.observe(inactive_slot(modest));
    table.observe(inactive_slot(modest));

    table
        .apply_report(
            report(modest, at(9, 0), Resources::new(60_000, 0, 0), true),
            &policy(),
        )
        .unwrap();
    table
        .apply_report(report(target(), at(9, 0), rich(), true), &policy())
        .unwrap();

    let queue = table.attack_queue(&ExchangeRatio::default());
    let order: Vec<Coordinate> = queue.iter().map(|(c, _)| *c).collect();
    assert_eq!(order, vec![target(), modest]);
    assert_eq!(queue[0].1, rich().scale(0.5));
}

#[test]
fn garbage_collection_resets_stale_and_raided() {
    let fresh = Coordinate::planet(1, 111, 1);
    let mut table = table_with_pending(target());
    table.observe(inactive_slot(fresh));
    table.observe(inactive_slot(fresh));

    table
        .apply_report(report(target(), at(1, 0), rich(), true), &policy())
        .unwrap();
    table.mark_attack_sent(&target()).unwrap();
    table
        .apply_report(report(fresh, at(9, 0), rich(), true), &policy())
        .unwrap();

    let reset = table.collect_garbage(at(10, 0), Duration::hours(4), &[]);
    assert_eq!(reset, 1);
    let raided = table.get(&target()).unwrap();
    assert_eq!(raided.state, FarmState::ProbesPending);
    assert!(raided.report.is_none());
    assert_eq!(table.get(&fresh).unwrap().state, FarmState::AttackPending);

    let reset = table.collect_garbage(at(14, 0), Duration::hours(4), &[]);
    assert_eq!(reset, 1);
    assert_eq!(table.get(&fresh).unwrap().state, FarmState::ProbesPending);
}

#[test]
fn outbound_raid_holds_the_target() {
    let mut table = table_with_pending(target());
    table
        .apply_report(report(target(), at(9, 0), rich(), true), &policy())
        .unwrap();
    table.mark_attack_sent(&target()).unwrap();

    assert_eq!(table.collect_garbage(at(9, 5), Duration::hours(4), &[target()]), 0);
    assert_eq!(table.get(&target()).unwrap().state, FarmState::AttackSent);
    assert!(table.probe_queue(2).is_empty());
    // Even a report past retention waits for the raid.
    assert_eq!(table.collect_garbage(at(15, 0), Duration::hours(4), &[target()]), 0);

    assert_eq!(table.collect_garbage(at(15, 0), Duration::hours(4), &[]), 1);
    assert_eq!(table.get(&target()).unwrap().state, FarmState::ProbesPending);
}

#[test]
fn probes_that_never_report_are_retried() {
    let mut table = table_with_pending(target());
    table.mark_probes_sent(&target(), at(9, 0)).unwrap();

    assert_eq!(table.collect_garbage(at(12, 0), Duration::hours(4), &[]), 0);
    assert_eq!(table.get(&target()).unwrap().state, FarmState::ProbesSent);

    assert_eq!(table.collect_garbage(at(13, 30), Duration::hours(4), &[]), 1);
    let retried = table.get(&target()).unwrap();
    assert_eq!(retried.state, FarmState::ProbesPending);
    assert!(retried.probes_sent_at.is_none());
}

#[test]
fn range_sync_drops_vanished_positions() {
    let gone = Coordinate::planet(1, 105, 9);
    let elsewhere = Coordinate::planet(3, 300, 1);
    let mut table = table_with_pending(target());
    table.observe(inactive_slot(gone));
    table.observe(inactive_slot(elsewhere));

    table.sync_range(
        |c| c.galaxy == 1 && c.system == 105,
        vec![inactive_slot(target())],
    );
    assert!(table.get(&gone).is_none());
    assert!(table.get(&elsewhere).is_some());
    assert_eq!(table.get(&target()).unwrap().state, FarmState::ProbesPending);
}
