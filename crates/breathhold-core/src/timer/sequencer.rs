//! Breathing sequencer.
//!
//! Walks a [`PatternConfig`] phase by phase:
//!
//! ```text
//! Inhale -> (Hold) -> Exhale -> (next cycle's Inhale) ... -> Completed
//! ```
//!
//! Each coarse tick subtracts one tick interval from the remaining time of
//! the current phase. When it reaches zero the sequencer advances. On
//! reaching `Completed` it disarms its tick source, reports completion once
//! and stays inert until [`BreathingSequencer::rearm`] is called.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::pattern::PatternConfig;
use super::tick::{IntervalTicker, TickSource};

/// Position in the breathing sequence, with cycle metadata for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreathingPhase {
    Idle,
    Inhale { cycle: u32, total: u32 },
    Hold { cycle: u32, total: u32 },
    Exhale { cycle: u32, total: u32 },
    Transition,
    Completed,
}

impl BreathingPhase {
    /// `(cycle, total)` for the in-cycle phases.
    pub fn cycle(&self) -> Option<(u32, u32)> {
        match *self {
            BreathingPhase::Inhale { cycle, total }
            | BreathingPhase::Hold { cycle, total }
            | BreathingPhase::Exhale { cycle, total } => Some((cycle, total)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    PhaseChanged(BreathingPhase),
    Completed,
}

#[derive(Debug, Clone)]
pub struct BreathingSequencer<T: TickSource = IntervalTicker> {
    config: PatternConfig,
    ticker: T,
    phase: BreathingPhase,
    remaining_ms: u64,
    elapsed_ms: u64,
    finished: bool,
}

impl BreathingSequencer<IntervalTicker> {
    pub fn new(config: PatternConfig) -> Self {
        Self::with_ticker(config, IntervalTicker::default())
    }
}

impl<T: TickSource> BreathingSequencer<T> {
    pub fn with_ticker(config: PatternConfig, mut ticker: T) -> Self {
        ticker.disarm();
        Self {
            config,
            ticker,
            phase: BreathingPhase::Idle,
            remaining_ms: 0,
            elapsed_ms: 0,
            finished: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn phase(&self) -> BreathingPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds left in the current phase.
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_ms as f64 / 1000.0
    }

    /// Seconds left in the current phase, rounded up for display.
    pub fn remaining_display_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    /// 0.0 .. 1.0 progress across the whole sequence.
    pub fn progress(&self) -> f64 {
        if self.finished {
            return 1.0;
        }
        let total = secs_to_ms(self.config.total_secs());
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_ms as f64 / total as f64).min(1.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the first inhale. Ignored while active or after completion.
    pub fn start(&mut self, now: Duration) -> Option<SequencerEvent> {
        if self.is_active() || self.finished {
            return None;
        }
        self.elapsed_ms = 0;
        self.enter(BreathingPhase::Inhale {
            cycle: 1,
            total: self.config.cycles,
        });
        self.ticker.arm(now);
        Some(SequencerEvent::PhaseChanged(self.phase))
    }

    /// Disarm without completing. No further events are produced.
    pub fn stop(&mut self) {
        self.ticker.disarm();
    }

    /// Reset to `Idle` with a new config so the sequence can run again.
    pub fn rearm(&mut self, config: PatternConfig) {
        self.ticker.disarm();
        self.config = config;
        self.phase = BreathingPhase::Idle;
        self.remaining_ms = 0;
        self.elapsed_ms = 0;
        self.finished = false;
    }

    /// Poll the tick source and advance if a tick is due.
    pub fn tick(&mut self, now: Duration) -> Vec<SequencerEvent> {
        if !self.ticker.poll(now) {
            return Vec::new();
        }
        let step = duration_ms(self.ticker.interval());
        self.elapsed_ms = self.elapsed_ms.saturating_add(step);
        self.remaining_ms = self.remaining_ms.saturating_sub(step);
        if self.remaining_ms > 0 {
            return Vec::new();
        }
        vec![self.advance()]
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> SequencerEvent {
        let total = self.config.cycles;
        let next = match self.phase {
            BreathingPhase::Inhale { cycle, .. } => match self.config.hold_secs {
                Some(_) => BreathingPhase::Hold { cycle, total },
                None => BreathingPhase::Exhale { cycle, total },
            },
            BreathingPhase::Hold { cycle, .. } => BreathingPhase::Exhale { cycle, total },
            BreathingPhase::Exhale { cycle, .. } if cycle < total => BreathingPhase::Inhale {
                cycle: cycle + 1,
                total,
            },
            _ => BreathingPhase::Completed,
        };

        if next == BreathingPhase::Completed {
            self.ticker.disarm();
            self.phase = BreathingPhase::Completed;
            self.remaining_ms = 0;
            self.finished = true;
            return SequencerEvent::Completed;
        }

        self.enter(next);
        SequencerEvent::PhaseChanged(next)
    }

    fn enter(&mut self, phase: BreathingPhase) {
        let secs = match phase {
            BreathingPhase::Inhale { .. } => self.config.inhale_secs,
            BreathingPhase::Hold { .. } => self.config.hold_secs.unwrap_or(0.0),
            BreathingPhase::Exhale { .. } => self.config.exhale_secs,
            _ => 0.0,
        };
        self.phase = phase;
        self.remaining_ms = secs_to_ms(secs);
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::PatternVariant;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Drive the sequencer at 10ms host resolution until it finishes.
    fn run_to_end<T: TickSource>(seq: &mut BreathingSequencer<T>) -> Vec<SequencerEvent> {
        let mut events = Vec::new();
        if let Some(ev) = seq.start(ms(0)) {
            events.push(ev);
        }
        let mut now = 0;
        while !seq.is_finished() && now < 600_000 {
            now += 10;
            events.extend(seq.tick(ms(now)));
        }
        events
    }

    #[test]
    fn standard_visits_inhale_exhale_three_times() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        let events = run_to_end(&mut seq);
        let phases: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SequencerEvent::PhaseChanged(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                BreathingPhase::Inhale { cycle: 1, total: 3 },
                BreathingPhase::Exhale { cycle: 1, total: 3 },
                BreathingPhase::Inhale { cycle: 2, total: 3 },
                BreathingPhase::Exhale { cycle: 2, total: 3 },
                BreathingPhase::Inhale { cycle: 3, total: 3 },
                BreathingPhase::Exhale { cycle: 3, total: 3 },
            ]
        );
        assert_eq!(events.last(), Some(&SequencerEvent::Completed));
        assert_eq!(seq.phase(), BreathingPhase::Completed);
        assert!(!seq.is_active());
    }

    #[test]
    fn mid_hold_sits_between_inhale_and_exhale() {
        let mut seq = BreathingSequencer::new(PatternVariant::Box.config());
        let events = run_to_end(&mut seq);
        let first_three: Vec<_> = events.iter().take(3).copied().collect();
        assert_eq!(
            first_three,
            vec![
                SequencerEvent::PhaseChanged(BreathingPhase::Inhale { cycle: 1, total: 4 }),
                SequencerEvent::PhaseChanged(BreathingPhase::Hold { cycle: 1, total: 4 }),
                SequencerEvent::PhaseChanged(BreathingPhase::Exhale { cycle: 1, total: 4 }),
            ]
        );
    }

    #[test]
    fn phase_lasts_its_configured_time() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        seq.start(ms(0));
        for t in (10..4_000).step_by(10) {
            assert!(seq.tick(ms(t)).is_empty(), "advanced early at {t}ms");
        }
        assert_eq!(
            seq.tick(ms(4_000)),
            vec![SequencerEvent::PhaseChanged(BreathingPhase::Exhale { cycle: 1, total: 3 })]
        );
        assert_eq!(seq.remaining_display_secs(), 6);
    }

    #[test]
    fn missed_ticks_are_not_replayed() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        seq.start(ms(0));
        // Host was suspended for ~4s: only one coarse tick is delivered.
        assert!(seq.tick(ms(3_950)).is_empty());
        assert_eq!(seq.phase(), BreathingPhase::Inhale { cycle: 1, total: 3 });
        assert!((seq.remaining_secs() - 3.9).abs() < 1e-9);
    }

    #[test]
    fn remaining_rounds_up_for_display() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        seq.start(ms(0));
        for t in (100..=500).step_by(100) {
            seq.tick(ms(t));
        }
        assert!((seq.remaining_secs() - 3.5).abs() < 1e-9);
        assert_eq!(seq.remaining_display_secs(), 4);
    }

    #[test]
    fn start_while_active_is_ignored() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        assert!(seq.start(ms(0)).is_some());
        assert!(seq.start(ms(50)).is_none());
        // A second registration would double-decrement; one tick removes 100ms.
        seq.tick(ms(100));
        assert!((seq.remaining_secs() - 3.9).abs() < 1e-9);
    }

    #[test]
    fn completed_sequencer_is_inert_until_rearmed() {
        let config = PatternConfig::new(0.2, 0.2, None, 1).unwrap();
        let mut seq = BreathingSequencer::new(config);
        let events = run_to_end(&mut seq);
        assert_eq!(events.iter().filter(|e| **e == SequencerEvent::Completed).count(), 1);
        assert!(seq.start(ms(10_000)).is_none());
        assert!(seq.tick(ms(20_000)).is_empty());

        seq.rearm(config);
        assert_eq!(seq.phase(), BreathingPhase::Idle);
        assert!(seq.start(ms(30_000)).is_some());
    }

    #[test]
    fn stop_silences_ticks() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        seq.start(ms(0));
        seq.stop();
        assert!(seq.tick(ms(60_000)).is_empty());
        assert!(!seq.is_finished());
    }

    #[test]
    fn progress_reaches_one_on_completion() {
        let mut seq = BreathingSequencer::new(PatternVariant::Standard.config());
        assert_eq!(seq.progress(), 0.0);
        run_to_end(&mut seq);
        assert_eq!(seq.progress(), 1.0);
    }
}
