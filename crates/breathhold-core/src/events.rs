use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::display::CompletionCategory;
use crate::progress::UnlockFeature;
use crate::session::SessionState;
use crate::timer::{BreathingPhase, PatternVariant};

/// Every state change in the session machine produces an Event.
/// The host consumes them synchronously from the call that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        variant: PatternVariant,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: BreathingPhase,
        /// Seconds in the new phase, rounded up.
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    BreathingCompleted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    HoldStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    HoldCompleted {
        session_id: Uuid,
        hold_secs: f64,
        category: CompletionCategory,
        at: DateTime<Utc>,
    },
    PersonalBest {
        hold_secs: f64,
        previous_secs: f64,
        at: DateTime<Utc>,
    },
    FeatureUnlocked {
        feature: UnlockFeature,
        streak: u32,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        session_id: Uuid,
        from_state: SessionState,
        at: DateTime<Utc>,
    },
    ReturnedToReady {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        phase: BreathingPhase,
        title: String,
        instruction: String,
        variant: Option<PatternVariant>,
        phase_remaining_secs: Option<u64>,
        sequence_progress: f64,
        hold_elapsed_secs: f64,
        at: DateTime<Utc>,
    },
}
