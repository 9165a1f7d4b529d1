//! Session state machine.
//!
//! Owns the single active session and the two timing components. Like the
//! components it drives, it has no thread of its own: the host calls
//! [`SessionMachine::tick`] periodically and user actions directly, all from
//! one context.
//!
//! ## State Transitions
//!
//! ```text
//! Ready -> Breathing -> Transitioning -> Holding -> Completed -> Ready
//!            \______________\_______________\_____ cancel ____/
//! ```
//!
//! Operations called in the wrong state are ignored and return no events.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::record::Session;
use crate::display::{self, CompletionCategory};
use crate::events::Event;
use crate::progress::Progress;
use crate::storage::{NullSink, PersistJob, PersistenceSink, SessionConfig};
use crate::timer::{
    BreathingPhase, BreathingSequencer, Clock, FrameTicker, HoldStopwatch, IntervalTicker,
    PatternVariant, SequencerEvent, SystemClock, TickSource, BREATHING_TICK, FRAME_TICK,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Ready,
    Breathing,
    Transitioning,
    Holding,
    Completed,
}

impl SessionState {
    /// States a session can be cancelled from.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            SessionState::Breathing | SessionState::Transitioning | SessionState::Holding
        )
    }
}

/// Timing knobs for the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineSettings {
    pub transition_delay: Duration,
    pub breathing_tick: Duration,
    pub frame_tick: Duration,
}

impl MachineSettings {
    /// Cap the frame tick at the breathing tick.
    ///
    /// The host calls `tick()` once per frame and the breathing ticker applies
    /// at most one step per call, so a slower frame would stretch every phase.
    pub fn normalized(self) -> Self {
        Self {
            frame_tick: self.frame_tick.min(self.breathing_tick),
            ..self
        }
    }
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            transition_delay: Duration::from_secs(2),
            breathing_tick: BREATHING_TICK,
            frame_tick: FRAME_TICK,
        }
    }
}

impl From<&SessionConfig> for MachineSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            transition_delay: config.transition_delay(),
            breathing_tick: config.breathing_tick(),
            frame_tick: config.frame_tick(),
        }
        .normalized()
    }
}

/// Generic over the clock and both tick sources; the defaults are the
/// production ones.
pub struct SessionMachine<C = SystemClock, B = IntervalTicker, F = FrameTicker>
where
    C: Clock,
    B: TickSource,
    F: TickSource,
{
    clock: C,
    settings: MachineSettings,
    state: SessionState,
    session: Option<Session>,
    sequencer: BreathingSequencer<B>,
    stopwatch: HoldStopwatch<F>,
    transition_due: Option<Duration>,
    progress: Progress,
    sink: Box<dyn PersistenceSink>,
}

impl<C: Clock> SessionMachine<C> {
    /// Create a machine in `Ready` that owns `progress` for its lifetime.
    ///
    /// Completed sessions are dropped until a sink is attached with
    /// [`with_sink`](Self::with_sink).
    pub fn new(clock: C, progress: Progress) -> Self {
        let settings = MachineSettings::default();
        let (sequencer, stopwatch) = build_timers(&settings);
        Self::from_parts(clock, progress, settings, sequencer, stopwatch)
    }

    /// Replace timing settings and rebuild both timers. Only takes effect
    /// while `Ready`.
    pub fn with_settings(mut self, settings: MachineSettings) -> Self {
        if self.state == SessionState::Ready {
            let settings = settings.normalized();
            let (sequencer, stopwatch) = build_timers(&settings);
            self.settings = settings;
            self.sequencer = sequencer;
            self.stopwatch = stopwatch;
        }
        self
    }
}

impl<C: Clock, B: TickSource, F: TickSource> SessionMachine<C, B, F> {
    /// Assemble a machine from already-built timers.
    ///
    /// Only `settings.transition_delay` is read here; tick periods come from
    /// the timers themselves.
    pub fn from_parts(
        clock: C,
        progress: Progress,
        settings: MachineSettings,
        mut sequencer: BreathingSequencer<B>,
        mut stopwatch: HoldStopwatch<F>,
    ) -> Self {
        let config = *sequencer.config();
        sequencer.rearm(config);
        stopwatch.reset();
        Self {
            clock,
            settings,
            state: SessionState::Ready,
            session: None,
            sequencer,
            stopwatch,
            transition_due: None,
            progress,
            sink: Box::new(NullSink),
        }
    }

    pub fn with_sink(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    /// The in-progress session, or the finished one while `Completed`.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Tear down the machine and hand back the ledger.
    pub fn into_progress(self) -> Progress {
        self.progress
    }

    pub fn phase(&self) -> BreathingPhase {
        match self.state {
            SessionState::Ready => BreathingPhase::Idle,
            SessionState::Breathing => self.sequencer.phase(),
            SessionState::Transitioning => BreathingPhase::Transition,
            SessionState::Holding | SessionState::Completed => BreathingPhase::Completed,
        }
    }

    /// Whole seconds left in the current breathing phase or transition pause.
    pub fn phase_remaining_secs(&self) -> Option<u64> {
        match self.state {
            SessionState::Breathing => Some(self.sequencer.remaining_display_secs()),
            SessionState::Transitioning => self.transition_remaining().map(ceil_secs),
            _ => None,
        }
    }

    pub fn transition_remaining(&self) -> Option<Duration> {
        self.transition_due
            .map(|due| due.saturating_sub(self.clock.monotonic()))
    }

    /// 0.0 .. 1.0 progress through the breathing sequence.
    pub fn sequence_progress(&self) -> f64 {
        match self.state {
            SessionState::Ready => 0.0,
            SessionState::Breathing => self.sequencer.progress(),
            _ => 1.0,
        }
    }

    /// Hold time as of the last frame tick (final value once completed).
    pub fn hold_elapsed(&self) -> Duration {
        match self.state {
            SessionState::Holding | SessionState::Completed => self.stopwatch.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn completion_category(&self) -> Option<CompletionCategory> {
        match (&self.state, &self.session) {
            (SessionState::Completed, Some(session)) => {
                Some(CompletionCategory::for_hold(session.hold_secs))
            }
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        display::state_title(self.state)
    }

    pub fn instruction(&self) -> &'static str {
        display::state_instruction(self.state)
    }

    /// Whether any tick source or the transition pause is armed.
    pub fn has_armed_timers(&self) -> bool {
        self.sequencer.is_active() || self.stopwatch.is_running() || self.transition_due.is_some()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            phase: self.phase(),
            title: self.title().to_string(),
            instruction: self.instruction().to_string(),
            variant: self.session.as_ref().map(|s| s.variant),
            phase_remaining_secs: self.phase_remaining_secs(),
            sequence_progress: self.sequence_progress(),
            hold_elapsed_secs: self.hold_elapsed().as_secs_f64(),
            at: self.clock.wall(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_session(&mut self, variant: PatternVariant) -> Vec<Event> {
        if self.state != SessionState::Ready {
            tracing::debug!(state = ?self.state, "start_session ignored");
            return Vec::new();
        }
        let now = self.clock.monotonic();
        let at = self.clock.wall();

        let session = Session::begin(variant, at);
        let mut events = vec![Event::SessionStarted {
            session_id: session.id,
            variant,
            at,
        }];
        tracing::debug!(session_id = %session.id, %variant, "Session started");
        self.session = Some(session);
        self.stopwatch.reset();
        self.sequencer.rearm(variant.config());
        self.state = SessionState::Breathing;

        if let Some(ev) = self.sequencer.start(now) {
            self.on_sequencer_event(ev, now, &mut events);
        }
        events
    }

    pub fn end_hold(&mut self) -> Vec<Event> {
        if self.state != SessionState::Holding {
            tracing::debug!(state = ?self.state, "end_hold ignored");
            return Vec::new();
        }
        let now = self.clock.monotonic();
        let at = self.clock.wall();
        let held = self.stopwatch.stop(now);

        let Some(mut session) = self.session.take() else {
            tracing::warn!("Holding without a session; resetting");
            self.reset_to_ready();
            return Vec::new();
        };
        session.complete(held.as_secs_f64(), at);
        let hold_secs = session.hold_secs;

        let mut events = vec![Event::HoldCompleted {
            session_id: session.id,
            hold_secs,
            category: CompletionCategory::for_hold(hold_secs),
            at,
        }];
        if let Some(outcome) = self.progress.fold(&session) {
            if let Some(previous_secs) = outcome.new_personal_best {
                events.push(Event::PersonalBest {
                    hold_secs,
                    previous_secs,
                    at,
                });
            }
            events.extend(outcome.newly_unlocked.into_iter().map(|feature| {
                Event::FeatureUnlocked {
                    feature,
                    streak: outcome.streak,
                    at,
                }
            }));
        }

        tracing::debug!(session_id = %session.id, hold_secs, "Hold completed");
        self.sink.submit(PersistJob {
            session: session.clone(),
            progress: self.progress.clone(),
        });
        self.session = Some(session);
        self.state = SessionState::Completed;
        events
    }

    pub fn return_to_main(&mut self) -> Vec<Event> {
        if self.state != SessionState::Completed {
            tracing::debug!(state = ?self.state, "return_to_main ignored");
            return Vec::new();
        }
        self.reset_to_ready();
        vec![Event::ReturnedToReady {
            at: self.clock.wall(),
        }]
    }

    /// Abandon the active session without recording it.
    ///
    /// Every tick source is disarmed before this returns; later `tick()`
    /// calls produce nothing until a new session starts.
    pub fn cancel_session(&mut self) -> Vec<Event> {
        if !self.state.is_active() {
            tracing::debug!(state = ?self.state, "cancel_session ignored");
            return Vec::new();
        }
        let from_state = self.state;
        let session_id = self.session.as_ref().map(|s| s.id);
        self.reset_to_ready();
        tracing::debug!(?session_id, ?from_state, "Session cancelled");

        session_id
            .map(|session_id| Event::SessionCancelled {
                session_id,
                from_state,
                at: self.clock.wall(),
            })
            .into_iter()
            .collect()
    }

    /// Advance whichever timer the current state owns.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.monotonic();
        let mut events = Vec::new();
        match self.state {
            SessionState::Breathing => {
                for ev in self.sequencer.tick(now) {
                    self.on_sequencer_event(ev, now, &mut events);
                }
            }
            SessionState::Transitioning => {
                if self.transition_due.is_some_and(|due| now >= due) {
                    self.enter_holding(now, &mut events);
                }
            }
            SessionState::Holding => {
                self.stopwatch.tick(now);
            }
            SessionState::Ready | SessionState::Completed => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_sequencer_event(&mut self, ev: SequencerEvent, now: Duration, events: &mut Vec<Event>) {
        let at = self.clock.wall();
        match ev {
            SequencerEvent::PhaseChanged(phase) => events.push(Event::PhaseChanged {
                phase,
                remaining_secs: self.sequencer.remaining_display_secs(),
                at,
            }),
            SequencerEvent::Completed => {
                self.state = SessionState::Transitioning;
                self.transition_due = Some(now + self.settings.transition_delay);
                if let Some(session) = &self.session {
                    events.push(Event::BreathingCompleted {
                        session_id: session.id,
                        at,
                    });
                }
                events.push(Event::PhaseChanged {
                    phase: BreathingPhase::Transition,
                    remaining_secs: ceil_secs(self.settings.transition_delay),
                    at,
                });
            }
        }
    }

    fn enter_holding(&mut self, now: Duration, events: &mut Vec<Event>) {
        self.transition_due = None;
        self.stopwatch.start(now);
        self.state = SessionState::Holding;
        if let Some(session) = &self.session {
            tracing::debug!(session_id = %session.id, "Hold started");
            events.push(Event::HoldStarted {
                session_id: session.id,
                at: self.clock.wall(),
            });
        }
    }

    fn reset_to_ready(&mut self) {
        let config = *self.sequencer.config();
        self.sequencer.rearm(config);
        self.stopwatch.reset();
        self.transition_due = None;
        self.session = None;
        self.state = SessionState::Ready;
    }
}

fn build_timers(
    settings: &MachineSettings,
) -> (BreathingSequencer<IntervalTicker>, HoldStopwatch<FrameTicker>) {
    (
        BreathingSequencer::with_ticker(
            PatternVariant::default().config(),
            IntervalTicker::new(settings.breathing_tick),
        ),
        HoldStopwatch::with_ticker(FrameTicker::new(settings.frame_tick)),
    )
}

fn ceil_secs(d: Duration) -> u64 {
    let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
    ms.div_ceil(1000)
}
