//! Property tests for the breathing sequencer.

use std::time::Duration;

use breathhold_core::timer::{BreathingSequencer, SequencerEvent};
use breathhold_core::{BreathingPhase, PatternConfig, PatternVariant};
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = PatternConfig> {
    (1u32..=8, 1u32..=8, prop::option::of(1u32..=8), 1u32..=5).prop_map(
        |(inhale, exhale, hold, cycles)| {
            PatternConfig::new(
                f64::from(inhale),
                f64::from(exhale),
                hold.map(f64::from),
                cycles,
            )
            .unwrap()
        },
    )
}

fn arb_variant() -> impl Strategy<Value = PatternVariant> {
    prop_oneof![
        Just(PatternVariant::Standard),
        Just(PatternVariant::Box),
        Just(PatternVariant::MultiHold),
    ]
}

/// Run to completion with a fixed frame step, returning every event and the
/// instant of the last tick.
fn drive(config: PatternConfig, step: Duration) -> (Vec<SequencerEvent>, Duration) {
    let mut seq = BreathingSequencer::new(config);
    let mut now = Duration::ZERO;
    let mut events: Vec<SequencerEvent> = seq.start(now).into_iter().collect();
    // At most one tick per poll, so frames longer than a tick need more polls.
    let per_poll = step.min(Duration::from_millis(100)).as_millis() as u64;
    let cap = (config.total_secs() * 1000.0) as u64 * 2 / per_poll + 100;
    for _ in 0..cap {
        if seq.is_finished() {
            break;
        }
        now += step;
        events.extend(seq.tick(now));
    }
    (events, now)
}

fn phases(events: &[SequencerEvent]) -> Vec<BreathingPhase> {
    events
        .iter()
        .filter_map(|e| match e {
            SequencerEvent::PhaseChanged(p) => Some(*p),
            SequencerEvent::Completed => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn phases_follow_pattern_order(config in arb_config(), step_ms in 1u64..=100) {
        let (events, _) = drive(config, Duration::from_millis(step_ms));

        let mut expected = Vec::new();
        for cycle in 1..=config.cycles {
            let total = config.cycles;
            expected.push(BreathingPhase::Inhale { cycle, total });
            if config.hold_secs.is_some() {
                expected.push(BreathingPhase::Hold { cycle, total });
            }
            expected.push(BreathingPhase::Exhale { cycle, total });
        }
        prop_assert_eq!(phases(&events), expected);
    }

    #[test]
    fn completes_exactly_once_and_last(config in arb_config(), step_ms in 1u64..=250) {
        let (events, _) = drive(config, Duration::from_millis(step_ms));
        let completions = events
            .iter()
            .filter(|e| matches!(e, SequencerEvent::Completed))
            .count();
        prop_assert_eq!(completions, 1);
        prop_assert_eq!(events.last(), Some(&SequencerEvent::Completed));
    }

    #[test]
    fn completion_time_tracks_pattern_length(config in arb_config(), step_ms in 1u64..=100) {
        let step = Duration::from_millis(step_ms);
        let (_, finished_at) = drive(config, step);
        let total = Duration::from_millis((config.total_secs() * 1000.0) as u64);
        prop_assert!(finished_at >= total);
        prop_assert!(finished_at < total + step, "finished at {:?}, total {:?}", finished_at, total);
    }

    #[test]
    fn no_events_once_finished(variant in arb_variant(), extra_ms in 1u64..=60_000) {
        let config = variant.config();
        let (_, finished_at) = drive(config, Duration::from_millis(50));
        let mut seq = BreathingSequencer::new(config);
        seq.start(Duration::ZERO);
        let mut now = Duration::ZERO;
        while now < finished_at {
            now += Duration::from_millis(50);
            seq.tick(now);
        }
        prop_assert!(seq.is_finished());
        prop_assert!(seq.tick(now + Duration::from_millis(extra_ms)).is_empty());
        prop_assert!(seq.start(now).is_none());
    }

    #[test]
    fn stop_silences_sequence(variant in arb_variant(), stop_after_ms in 0u64..=20_000) {
        let mut seq = BreathingSequencer::new(variant.config());
        seq.start(Duration::ZERO);
        let mut now = Duration::ZERO;
        while now < Duration::from_millis(stop_after_ms) {
            now += Duration::from_millis(20);
            seq.tick(now);
        }
        seq.stop();
        prop_assert!(!seq.is_active());
        for _ in 0..200 {
            now += Duration::from_millis(100);
            prop_assert!(seq.tick(now).is_empty());
        }
    }
}
