//! # Breathhold Core Library
//!
//! Core logic for a guided breath-hold trainer. The CLI binary is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: breathing sequencer and hold stopwatch, both driven by the
//!   caller invoking `tick()` against a [`Clock`]
//! - **Session**: the state machine that owns the active session
//! - **Progress**: streaks, personal best and feature unlocks folded from
//!   completed sessions
//! - **Storage**: SQLite key/value persistence, a background writer and
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: Ready → Breathing → Transitioning → Holding → Completed
//! - [`Progress`]: the progress ledger
//! - [`Database`]: persistence for progress and session history
//! - [`Config`]: application configuration management

pub mod display;
pub mod error;
pub mod events;
pub mod progress;
pub mod session;
pub mod storage;
pub mod timer;

pub use display::CompletionCategory;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use progress::{FoldOutcome, Progress, UnlockFeature};
pub use session::{MachineSettings, Session, SessionMachine, SessionState};
pub use storage::{BackgroundWriter, Config, Database, PersistJob, PersistenceSink, ProgressStore};
pub use timer::{BreathingPhase, Clock, ManualClock, PatternConfig, PatternVariant, SystemClock};
