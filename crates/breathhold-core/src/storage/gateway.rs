use crate::error::Result;
use crate::progress::Progress;
use crate::session::Session;

/// Load/save boundary for the ledger and session history.
///
/// Loads never fail: a missing or unreadable value yields the default.
/// Saves are best-effort and report errors for the caller to log.
pub trait ProgressStore {
    fn load_progress(&self) -> Progress;

    fn save_progress(&self, progress: &Progress) -> Result<()>;

    /// Append to the bounded history, evicting the oldest entries.
    fn save_session(&self, session: &Session) -> Result<()>;

    /// Recorded sessions, oldest first.
    fn load_history(&self) -> Vec<Session>;
}
