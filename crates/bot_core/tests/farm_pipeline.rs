//! Integration test: galaxy scan → probe waves → reports → attack queue → reset.

use bot_core::test_fixtures::{at, inactive_slot, report};
use bot_core::*;
use chrono::Duration;

#[test]
fn scan_probe_attack_cycle() {
    let policy = ReportPolicy {
        min_loot: 5000,
        ratio: ExchangeRatio::default(),
    };
    let positions: Vec<Coordinate> = (1..=6).map(|p| Coordinate::planet(2, 40, p)).collect();
    let mut table = FarmTable::new();

    // Two scans of the same system: everything ends up waiting on probes.
    for _ in 0..2 {
        table.sync_range(
            |c| c.galaxy == 2 && c.system == 40,
            positions.iter().copied().map(inactive_slot).collect(),
        );
    }
    assert_eq!(table.in_state(FarmState::ProbesPending).len(), 6);

    for (coordinate, probes) in table.probe_queue(1) {
        assert_eq!(probes, 1);
        table.mark_probes_sent(&coordinate, at(11, 0)).unwrap();
    }
    assert!(table.probe_queue(1).is_empty());

    // Odd positions come back defenceless and rich; even ones are blind.
    for (i, coordinate) in positions.iter().enumerate() {
        let complete = i % 2 == 0;
        let loot = Resources::new(50_000 * (i as u64 + 1), 20_000, 5000);
        table
            .apply_report(report(*coordinate, at(12, 0), loot, complete), &policy)
            .unwrap();
    }
    assert_eq!(table.in_state(FarmState::AttackPending).len(), 3);
    assert_eq!(table.in_state(FarmState::ProbesRequired).len(), 3);
    assert!(table.probe_queue(1).iter().all(|(_, n)| *n == 3));

    let queue = table.attack_queue(&policy.ratio);
    assert_eq!(queue.first().map(|(c, _)| *c), Some(positions[4]));
    for (coordinate, _) in &queue {
        table.mark_attack_sent(coordinate).unwrap();
    }

    let reset = table.collect_garbage(at(13, 0), Duration::hours(6), &[]);
    assert_eq!(reset, 3);
    assert_eq!(table.in_state(FarmState::ProbesPending).len(), 3);
    assert_eq!(table.in_state(FarmState::AttackSent).len(), 0);
}
