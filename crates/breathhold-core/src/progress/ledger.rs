//! Streak, personal-best and unlock bookkeeping.
//!
//! [`Progress`] only changes through [`Progress::fold`], one completed
//! session at a time in chronological order. Unlocks are derived from the
//! streak inside the fold and are never settable on their own.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::unlock::UnlockFeature;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    current_streak: u32,
    #[serde(default)]
    longest_streak: u32,
    #[serde(default)]
    total_sessions: u64,
    #[serde(default)]
    personal_best_secs: f64,
    #[serde(default)]
    last_session_date: Option<DateTime<Utc>>,
    #[serde(default)]
    unlocked: BTreeSet<UnlockFeature>,
}

/// What a fold changed beyond the counters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoldOutcome {
    /// Previous best when this session beat it.
    pub new_personal_best: Option<f64>,
    pub newly_unlocked: Vec<UnlockFeature>,
    pub streak: u32,
}

impl Progress {
    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn total_sessions(&self) -> u64 {
        self.total_sessions
    }

    pub fn personal_best_secs(&self) -> f64 {
        self.personal_best_secs
    }

    pub fn last_session_date(&self) -> Option<DateTime<Utc>> {
        self.last_session_date
    }

    pub fn unlocked(&self) -> &BTreeSet<UnlockFeature> {
        &self.unlocked
    }

    pub fn is_unlocked(&self, feature: UnlockFeature) -> bool {
        self.unlocked.contains(&feature)
    }

    // ── Fold ─────────────────────────────────────────────────────────

    /// Fold one completed session into the ledger.
    ///
    /// Returns `None` and leaves the ledger untouched when the session is not
    /// completed. Unlocks are recomputed after the streak update so they
    /// compare against the new streak.
    pub fn fold(&mut self, session: &Session) -> Option<FoldOutcome> {
        if !session.completed {
            return None;
        }
        let mut outcome = FoldOutcome::default();

        self.total_sessions += 1;

        if session.hold_secs > self.personal_best_secs {
            outcome.new_personal_best = Some(self.personal_best_secs);
            self.personal_best_secs = session.hold_secs;
        }

        self.current_streak = match self.last_session_date {
            None => 1,
            Some(last) => match day_gap(last, session.started_at) {
                0 => self.current_streak,
                1 => self.current_streak + 1,
                _ => 1,
            },
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_session_date = Some(session.started_at);
        outcome.streak = self.current_streak;

        for feature in UnlockFeature::earned_at(self.current_streak) {
            if self.unlocked.insert(feature) {
                outcome.newly_unlocked.push(feature);
            }
        }

        Some(outcome)
    }

    /// Rebuild a ledger by folding `sessions` in start order.
    pub fn replay<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut ordered: Vec<&Session> = sessions.into_iter().collect();
        ordered.sort_by_key(|s| s.started_at);
        let mut progress = Progress::default();
        for session in ordered {
            progress.fold(session);
        }
        progress
    }
}

/// Calendar day in the user's local time zone.
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Whole local days from `earlier` to `later`. Negative when the clock
/// went backwards.
fn day_gap(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (local_day(later) - local_day(earlier)).num_days()
}
