//! Tests for the periodic scheduler

use mirror_core::{CycleOutcome, SchedulerState, SyncControl, SyncScheduler};
use mirror_test_utils::TestTree;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

fn scheduler(tree: &TestTree, interval: Duration, control: std::sync::Arc<SyncControl>) -> SyncScheduler {
    SyncScheduler::new(tree.source(), tree.replica(), interval, control)
        .with_poll_interval(Duration::from_millis(10))
}

/// Poll `condition` until it holds or `timeout` passes.
fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_cycle_converges_replica() {
    let tree = TestTree::new();
    tree.write_source("x.txt", "H1");
    tree.write_replica("old.txt", "stale");
    let mut scheduler = scheduler(&tree, Duration::from_secs(60), SyncControl::new());

    let outcome = scheduler.run_cycle();

    match outcome {
        CycleOutcome::Completed(report) => {
            assert!(report.is_success());
            assert_eq!(report.files_added, 1);
            assert_eq!(report.files_removed, 1);
        }
        other => panic!("expected a completed cycle, got {:?}", other),
    }
    assert_eq!(scheduler.state(), SchedulerState::Running);
    tree.assert_converged();
}

#[test]
fn test_second_cycle_without_changes_is_a_no_op() {
    let tree = TestTree::new();
    tree.write_source("a/b.txt", "b");
    let mut scheduler = scheduler(&tree, Duration::from_secs(60), SyncControl::new());

    scheduler.run_cycle();
    let second = scheduler.run_cycle();

    assert_eq!(second, CycleOutcome::Completed(Default::default()));
}

#[test]
fn test_missing_source_skips_cycle() {
    let tree = TestTree::new();
    fs::remove_dir(tree.source()).unwrap();
    let mut scheduler = scheduler(&tree, Duration::from_secs(60), SyncControl::new());

    let outcome = scheduler.run_cycle();

    match outcome {
        CycleOutcome::Skipped { reason } => assert!(reason.contains("not found"), "{reason}"),
        other => panic!("expected a skipped cycle, got {:?}", other),
    }
}

#[test]
fn test_missing_replica_is_recreated() {
    let tree = TestTree::new();
    tree.write_source("x.txt", "x");
    fs::remove_dir(tree.replica()).unwrap();
    let mut scheduler = scheduler(&tree, Duration::from_secs(60), SyncControl::new());

    let outcome = scheduler.run_cycle();

    assert!(matches!(outcome, CycleOutcome::Completed(_)));
    tree.assert_replica_file("x.txt", "x");
}

#[test]
fn test_stop_before_start_runs_no_cycle() {
    let tree = TestTree::new();
    let control = SyncControl::new();
    control.request_stop();
    let mut scheduler = scheduler(&tree, Duration::from_secs(60), control);

    let summary = scheduler.run();

    assert_eq!(summary.cycles_completed, 0);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[test]
fn test_run_survives_vanishing_source_and_stops_promptly() {
    let tree = TestTree::new();
    tree.write_source("x.txt", "x");
    let control = SyncControl::new();
    let mut scheduler = SyncScheduler::new(tree.source(), tree.replica(), Duration::from_millis(50), control.clone())
        .with_poll_interval(Duration::from_millis(5));

    let replica = tree.replica();
    let handle = thread::spawn(move || scheduler.run());

    assert!(wait_until(Duration::from_secs(5), || replica.join("x.txt").exists()));
    fs::remove_dir_all(tree.source()).unwrap();
    thread::sleep(Duration::from_millis(200));

    control.request_stop();
    let summary = handle.join().unwrap();

    assert!(summary.cycles_completed >= 1);
    assert!(summary.cycles_skipped >= 1);
}

#[test]
fn test_immediate_sync_cuts_wait_short() {
    let tree = TestTree::new();
    tree.write_source("first.txt", "1");
    let control = SyncControl::new();
    let mut scheduler = scheduler(&tree, Duration::from_secs(5), control.clone());

    let replica = tree.replica();
    let handle = thread::spawn(move || scheduler.run());

    // First cycle runs immediately on start
    let first = replica.join("first.txt");
    assert!(wait_until(Duration::from_secs(2), || first.exists()));

    tree.write_source("second.txt", "2");
    let triggered = Instant::now();
    control.request_immediate_sync();

    let second = replica.join("second.txt");
    assert!(wait_until(Duration::from_secs(3), || second.exists()));
    assert!(
        triggered.elapsed() < Duration::from_secs(4),
        "sync-now took {:?}",
        triggered.elapsed()
    );

    control.request_stop();
    let summary = handle.join().unwrap();
    assert!(summary.cycles_completed >= 2);
}

#[test]
fn test_stop_latency_is_independent_of_interval() {
    let tree = TestTree::new();
    let control = SyncControl::new();
    let mut scheduler = scheduler(&tree, Duration::from_secs(3600), control.clone());

    let handle = thread::spawn(move || scheduler.run());
    thread::sleep(Duration::from_millis(100));

    let requested = Instant::now();
    control.request_stop();
    let summary = handle.join().unwrap();

    assert!(requested.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.cycles_completed, 1);
}
