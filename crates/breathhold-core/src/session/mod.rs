//! The active session and its lifecycle.

mod machine;
mod record;

pub use machine::{MachineSettings, SessionMachine, SessionState};
pub use record::Session;
