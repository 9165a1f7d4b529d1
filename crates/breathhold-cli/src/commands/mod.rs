pub mod config;
pub mod history;
pub mod session;
pub mod stats;
pub mod unlocks;
