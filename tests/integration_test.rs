use dining_table::instrument::{EventKind, Recorder};
use dining_table::lifecycle::{DinnerConfig, Dispatcher};
use dining_table::mock::MockBehavior;
use dining_table::philosopher::{Hook, PhilosopherError};
use dining_table::table::ForkState;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn position(recorder: &Recorder, philosopher: usize, kind: EventKind) -> usize {
    recorder
        .events()
        .iter()
        .position(|e| e.philosopher == philosopher && e.kind == kind)
        .unwrap_or_else(|| panic!("no {} event for philosopher {}", kind, philosopher))
}

/// Five philosophers, one cycle each, all at once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_five_philosophers_one_meal_each() {
    let recorder = Arc::new(Recorder::new());
    let dispatcher =
        Dispatcher::with_observer(DinnerConfig::new(5), (), recorder.clone()).unwrap();

    let report = dispatcher.run().await;

    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.reports.len(), 5);
    assert_eq!(report.meals(), 5);
    assert_eq!(recorder.count(EventKind::Eating), 5);

    for me in 0..5 {
        let next = (me + 1) % 5;
        for mine in recorder.eating_intervals(me) {
            for theirs in recorder.eating_intervals(next) {
                assert!(
                    !overlaps(&mine, &theirs),
                    "philosophers {} and {} ate at the same time",
                    me,
                    next
                );
            }
        }
    }
}

/// The smallest table: two philosophers fighting over the same two forks.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_philosophers_share_both_forks() {
    let recorder = Arc::new(Recorder::new());
    let dispatcher =
        Dispatcher::with_observer(DinnerConfig::new(2), (), recorder.clone()).unwrap();
    let table = dispatcher.table().clone();

    let report = tokio::time::timeout(Duration::from_secs(10), dispatcher.run())
        .await
        .expect("two philosophers deadlocked");

    assert!(report.is_success());
    assert_eq!(report.meals(), 2);
    assert!(table.all_free());

    let events = recorder.events();
    for fork in 0..2 {
        for philosopher in 0..2 {
            let count = |kind| {
                events
                    .iter()
                    .filter(|e| e.kind == kind && e.fork == Some(fork) && e.philosopher == philosopher)
                    .count()
            };
            assert_eq!(count(EventKind::Acquired), 1, "fork {} / philosopher {}", fork, philosopher);
            assert_eq!(count(EventKind::Released), 1, "fork {} / philosopher {}", fork, philosopher);
        }
    }
}

/// A slow eater only holds up its own neighbours.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_eater_does_not_block_distant_seats() {
    let mut mock = MockBehavior::new();
    mock.expect(0, Hook::Eat).delay(Duration::from_millis(100));

    let recorder = Arc::new(Recorder::new());
    let dispatcher =
        Dispatcher::with_observer(DinnerConfig::new(5).cycles(5), mock.clone(), recorder.clone())
            .unwrap();

    let report = dispatcher.run().await;
    assert!(report.is_success());
    for philosopher in 0..5 {
        assert_eq!(report.report(philosopher).map(|r| r.meals), Some(5));
    }

    // Seats 2 and 3 share no fork with seat 0; they finish long before its five
    // slow meals are over.
    let slow_done = position(&recorder, 0, EventKind::Finished);
    assert!(position(&recorder, 2, EventKind::Finished) < slow_done);
    assert!(position(&recorder, 3, EventKind::Finished) < slow_done);
    assert!(recorder.acquisitions(2).iter().all(|&f| f == 2 || f == 3));
    mock.verify();
}

/// A failing hook takes down one philosopher, not the dinner.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hook_failure_is_isolated() {
    let mut mock = MockBehavior::new();
    mock.expect(2, Hook::Eat).return_err("choked");

    let recorder = Arc::new(Recorder::new());
    let dispatcher =
        Dispatcher::with_observer(DinnerConfig::new(5).cycles(3), mock.clone(), recorder.clone())
            .unwrap();
    let table = dispatcher.table().clone();

    let report = dispatcher.run().await;

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    let failure = report.failure(2).expect("philosopher 2 should have failed");
    assert_eq!(failure.hook(), Some(Hook::Eat));
    assert!(failure.to_string().contains("choked"));

    for philosopher in [0, 1, 3, 4] {
        assert_eq!(report.report(philosopher).map(|r| r.meals), Some(3));
    }
    assert!(report.report(2).is_none());

    // Hooks after the failing one were skipped, but the forks still went back.
    assert_eq!(mock.call_count(2, Hook::PutLeft), 0);
    assert_eq!(recorder.count_for(2, EventKind::Acquired), 2);
    assert_eq!(recorder.count_for(2, EventKind::Released), 2);
    assert_eq!(recorder.count_for(2, EventKind::Failed), 1);
    for fork in 0..5 {
        assert_eq!(table.fork_state(fork), Some(ForkState::Free));
    }
    mock.verify();

    let first = report.into_result().unwrap_err();
    assert_eq!(first.philosopher(), 2);
}

/// A panicking hook is reported as that philosopher's failure; its forks are
/// released while the task unwinds.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hook_panic_is_isolated() {
    let mut mock = MockBehavior::new();
    mock.expect(1, Hook::PickRight).panic("slipped");

    let dispatcher = Dispatcher::new(DinnerConfig::new(5).cycles(2), mock.clone()).unwrap();
    let table = dispatcher.table().clone();

    let report = dispatcher.run().await;

    match report.failure(1) {
        Some(PhilosopherError::Panicked { message, .. }) => assert!(message.contains("slipped")),
        other => panic!("expected a panic failure, got {:?}", other),
    }
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.meals(), 8);
    assert!(table.all_free());
}

/// With a hungry timeout, a philosopher stuck behind a long meal gives up instead of
/// waiting, and that is not an error.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hungry_timeout_is_reported_not_failed() {
    let mut mock = MockBehavior::new();
    mock.expect(0, Hook::Eat).delay(Duration::from_millis(300));
    mock.expect(1, Hook::Eat).delay(Duration::from_millis(300));

    let recorder = Arc::new(Recorder::new());
    let config = DinnerConfig::new(2).hungry_timeout(Duration::from_millis(20));
    let dispatcher = Dispatcher::with_observer(config, mock, recorder.clone()).unwrap();
    let table = dispatcher.table().clone();

    let report = dispatcher.run().await;

    assert!(report.is_success());
    assert_eq!(report.meals() + report.timeouts(), 2);
    assert_eq!(report.meals(), 1);
    assert_eq!(report.timeouts(), 1);
    assert_eq!(recorder.count(EventKind::TimedOut), 1);
    assert!(table.all_free());
}

#[test]
fn test_config_errors_are_fatal_at_construction() {
    let err = Dispatcher::new(DinnerConfig::new(1), ()).err().unwrap();
    assert_eq!(err.to_string(), "A dinner needs at least 2 philosophers, got 1");
}
