mod config;
pub mod database;
mod gateway;
pub mod writer;

pub use config::{Config, SessionConfig, StorageConfig};
pub use database::{Database, DEFAULT_HISTORY_LIMIT};
pub use gateway::ProgressStore;
pub use writer::{BackgroundWriter, NullSink, PersistJob, PersistenceSink};

use std::path::PathBuf;

/// Returns `~/.config/breathhold[-dev]/` based on BREATHHOLD_ENV.
///
/// Set BREATHHOLD_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREATHHOLD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("breathhold-dev")
    } else {
        base_dir.join("breathhold")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
