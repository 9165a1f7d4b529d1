//! Integration tests for the full session lifecycle.
//!
//! These drive the session machine with a manual clock the way a host frame
//! loop would, and check what reaches the progress ledger and the store.

use std::time::Duration;

use breathhold_core::storage::{BackgroundWriter, Database, ProgressStore};
use breathhold_core::{
    CompletionCategory, Event, ManualClock, PatternVariant, Progress, SessionMachine,
    SessionState, UnlockFeature,
};

const FRAME: Duration = Duration::from_millis(16);

fn run(machine: &mut SessionMachine<ManualClock>, clock: &ManualClock, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    clock.run_for(Duration::from_millis(millis), FRAME, || events.extend(machine.tick()));
    events
}

/// Tick through breathing and the transition pause.
fn breathe(
    machine: &mut SessionMachine<ManualClock>,
    clock: &ManualClock,
    variant: PatternVariant,
) -> Vec<Event> {
    let mut events = machine.start_session(variant);
    let millis = (variant.config().total_secs() * 1000.0) as u64 + 2_000 + 100;
    events.extend(run(machine, clock, millis));
    events
}

#[test]
fn test_standard_session_end_to_end() {
    let clock = ManualClock::default();
    let mut machine = SessionMachine::new(clock.clone(), Progress::default());

    let events = breathe(&mut machine, &clock, PatternVariant::Standard);
    assert_eq!(machine.state(), SessionState::Holding);

    let phase_changes = events
        .iter()
        .filter(|e| matches!(e, Event::PhaseChanged { .. }))
        .count();
    // Three inhales, three exhales and the final-breath pause.
    assert_eq!(phase_changes, 7);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::HoldStarted { .. }))
            .count(),
        1
    );

    clock.advance(Duration::from_millis(42_300));
    let events = machine.end_hold();
    assert_eq!(machine.state(), SessionState::Completed);

    let Some(Event::HoldCompleted {
        hold_secs, category, ..
    }) = events.first()
    else {
        panic!("Expected HoldCompleted first, got {events:?}");
    };
    assert!((hold_secs - 42.3).abs() < 0.25, "held {hold_secs}");
    assert_eq!(*category, CompletionCategory::Steady);
    assert_eq!(machine.completion_category(), Some(CompletionCategory::Steady));

    let progress = machine.progress();
    assert_eq!(progress.total_sessions(), 1);
    assert_eq!(progress.current_streak(), 1);
    assert!((progress.personal_best_secs() - hold_secs).abs() < f64::EPSILON);

    machine.return_to_main();
    assert_eq!(machine.state(), SessionState::Ready);
}

#[test]
fn test_cancel_during_hold_records_nothing() {
    let clock = ManualClock::default();
    let mut machine = SessionMachine::new(clock.clone(), Progress::default());

    breathe(&mut machine, &clock, PatternVariant::Box);
    run(&mut machine, &clock, 5_000);
    let events = machine.cancel_session();

    assert!(matches!(
        events.as_slice(),
        [Event::SessionCancelled {
            from_state: SessionState::Holding,
            ..
        }]
    ));
    assert_eq!(machine.state(), SessionState::Ready);
    assert_eq!(machine.progress(), &Progress::default());
    assert!(!machine.has_armed_timers());
}

#[test]
fn test_no_events_after_cancel() {
    let clock = ManualClock::default();
    let mut machine = SessionMachine::new(clock.clone(), Progress::default());

    machine.start_session(PatternVariant::MultiHold);
    run(&mut machine, &clock, 9_000);
    machine.cancel_session();

    assert!(run(&mut machine, &clock, 120_000).is_empty());
    assert_eq!(machine.state(), SessionState::Ready);
}

#[test]
fn test_first_short_session_unlocks_vault() {
    let clock = ManualClock::default();
    let mut machine = SessionMachine::new(clock.clone(), Progress::default());

    breathe(&mut machine, &clock, PatternVariant::Standard);
    clock.advance(Duration::from_secs(10));
    let events = machine.end_hold();

    assert!(events.iter().any(|e| matches!(
        e,
        Event::FeatureUnlocked {
            feature: UnlockFeature::TheVault,
            ..
        }
    )));
    assert!(machine.progress().is_unlocked(UnlockFeature::TheVault));
    assert!(!machine.progress().is_unlocked(UnlockFeature::BoxBreathing));
}

#[test]
fn test_completed_sessions_persist_through_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breathhold.db");

    let clock = ManualClock::default();
    let store = Database::open_at(&path).unwrap();
    let progress = store.load_progress();
    let writer = BackgroundWriter::spawn(store).unwrap();

    let mut machine = SessionMachine::new(clock.clone(), progress).with_sink(writer);
    for hold in [12_000, 31_000] {
        breathe(&mut machine, &clock, PatternVariant::Standard);
        clock.advance(Duration::from_millis(hold));
        machine.end_hold();
        machine.return_to_main();
    }
    let expected = machine.into_progress();

    // Dropping the machine drops the writer, which drains its queue.
    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.load_progress(), expected);
    let history = db.load_history();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|s| s.completed));
    assert!((history[1].hold_secs - 31.0).abs() < 0.25);
}

#[test]
fn test_reloaded_ledger_continues_streak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breathhold.db");

    let first = ManualClock::default();
    {
        let store = Database::open_at(&path).unwrap();
        let writer = BackgroundWriter::spawn(store).unwrap();
        let mut machine =
            SessionMachine::new(first.clone(), Progress::default()).with_sink(writer);
        breathe(&mut machine, &first, PatternVariant::Standard);
        first.advance(Duration::from_secs(20));
        machine.end_hold();
    }

    // Same origin shifted by one day.
    let next_day = ManualClock::new(first.wall_origin() + chrono::Duration::days(1));
    let store = Database::open_at(&path).unwrap();
    let mut machine = SessionMachine::new(next_day.clone(), store.load_progress());
    breathe(&mut machine, &next_day, PatternVariant::Standard);
    next_day.advance(Duration::from_secs(15));
    machine.end_hold();

    assert_eq!(machine.progress().total_sessions(), 2);
    assert_eq!(machine.progress().current_streak(), 2);
    assert!((machine.progress().personal_best_secs() - 20.0).abs() < 0.25);
}
