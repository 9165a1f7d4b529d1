use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::PatternVariant;

/// One breathing + breath-hold attempt.
///
/// Created when a session begins and completed exactly once; a completed
/// session is never modified again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Measured breath-hold in seconds.
    #[serde(default)]
    pub hold_secs: f64,
    pub variant: PatternVariant,
    #[serde(default)]
    pub completed: bool,
}

impl Session {
    pub fn begin(variant: PatternVariant, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            ended_at: None,
            hold_secs: 0.0,
            variant,
            completed: false,
        }
    }

    /// Build an already-completed session (history import, tests).
    pub fn completed_at(
        variant: PatternVariant,
        started_at: DateTime<Utc>,
        hold_secs: f64,
    ) -> Self {
        let mut session = Self::begin(variant, started_at);
        let ended_at = started_at + chrono::Duration::milliseconds((hold_secs * 1000.0) as i64);
        session.complete(hold_secs, ended_at);
        session
    }

    /// Record the hold and mark the session completed.
    ///
    /// Returns `false` (and changes nothing) if it was already completed.
    pub fn complete(&mut self, hold_secs: f64, ended_at: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.hold_secs = hold_secs.max(0.0);
        self.ended_at = Some(ended_at);
        self.completed = true;
        true
    }
}
