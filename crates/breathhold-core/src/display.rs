//! Presentation metadata.
//!
//! Titles, instructions and messages are pure lookups over state values.
//! Nothing in the state machine reads them.

use serde::{Deserialize, Serialize};

use crate::session::SessionState;
use crate::timer::BreathingPhase;

pub fn state_title(state: SessionState) -> &'static str {
    match state {
        SessionState::Ready => "Breath Hold",
        SessionState::Breathing => "Prepare",
        SessionState::Transitioning => "Get Ready",
        SessionState::Holding => "Hold",
        SessionState::Completed => "Complete",
    }
}

pub fn state_instruction(state: SessionState) -> &'static str {
    match state {
        SessionState::Ready => "Choose a pattern and begin when you are ready",
        SessionState::Breathing => "Follow the breathing guide",
        SessionState::Transitioning => "Take one last full breath and hold it",
        SessionState::Holding => "Hold your breath. Stop when you need to breathe",
        SessionState::Completed => "Breathe normally",
    }
}

pub fn phase_label(phase: BreathingPhase) -> &'static str {
    match phase {
        BreathingPhase::Idle => "Ready",
        BreathingPhase::Inhale { .. } => "Inhale",
        BreathingPhase::Hold { .. } => "Hold",
        BreathingPhase::Exhale { .. } => "Exhale",
        BreathingPhase::Transition => "Final Breath",
        BreathingPhase::Completed => "Done",
    }
}

pub fn phase_instruction(phase: BreathingPhase) -> &'static str {
    match phase {
        BreathingPhase::Idle => "Sit comfortably",
        BreathingPhase::Inhale { .. } => "Breathe in slowly through your nose",
        BreathingPhase::Hold { .. } => "Hold gently",
        BreathingPhase::Exhale { .. } => "Breathe out slowly through your mouth",
        BreathingPhase::Transition => "Fill your lungs",
        BreathingPhase::Completed => "Preparation complete",
    }
}

/// "Cycle 2 of 3" for in-cycle phases.
pub fn cycle_caption(phase: BreathingPhase) -> Option<String> {
    phase
        .cycle()
        .map(|(cycle, total)| format!("Cycle {cycle} of {total}"))
}

/// Message band picked from the measured hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCategory {
    /// Under 30 seconds
    Warmup,
    /// 30 to 60 seconds
    Steady,
    /// 60 to 120 seconds
    Strong,
    /// 120 seconds and over
    Exceptional,
}

impl CompletionCategory {
    pub fn for_hold(hold_secs: f64) -> Self {
        if hold_secs >= 120.0 {
            CompletionCategory::Exceptional
        } else if hold_secs >= 60.0 {
            CompletionCategory::Strong
        } else if hold_secs >= 30.0 {
            CompletionCategory::Steady
        } else {
            CompletionCategory::Warmup
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            CompletionCategory::Warmup => "Good start. Every session builds tolerance.",
            CompletionCategory::Steady => "Solid hold. Your body is adapting.",
            CompletionCategory::Strong => "Over a minute. That is real control.",
            CompletionCategory::Exceptional => "Two minutes and beyond. Outstanding.",
        }
    }
}

/// Format seconds as `m:ss.t`.
pub fn format_hold(hold_secs: f64) -> String {
    let tenths = (hold_secs.max(0.0) * 10.0).round() as u64;
    let minutes = tenths / 600;
    let secs = (tenths % 600) / 10;
    format!("{}:{:02}.{}", minutes, secs, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_bands() {
        assert_eq!(CompletionCategory::for_hold(10.0), CompletionCategory::Warmup);
        assert_eq!(CompletionCategory::for_hold(42.3), CompletionCategory::Steady);
        assert_eq!(CompletionCategory::for_hold(60.0), CompletionCategory::Strong);
        assert_eq!(CompletionCategory::for_hold(125.0), CompletionCategory::Exceptional);
    }

    #[test]
    fn cycle_caption_only_for_cycle_phases() {
        assert_eq!(
            cycle_caption(BreathingPhase::Exhale { cycle: 2, total: 3 }).as_deref(),
            Some("Cycle 2 of 3")
        );
        assert!(cycle_caption(BreathingPhase::Transition).is_none());
    }

    #[test]
    fn formats_hold_time() {
        assert_eq!(format_hold(42.3), "0:42.3");
        assert_eq!(format_hold(125.04), "2:05.0");
    }

    #[test]
    fn every_state_has_a_title() {
        for state in [
            SessionState::Ready,
            SessionState::Breathing,
            SessionState::Transitioning,
            SessionState::Holding,
            SessionState::Completed,
        ] {
            assert!(!state_title(state).is_empty());
            assert!(!state_instruction(state).is_empty());
        }
    }
}
