//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The pattern selected when none is given
//! - Transition pause length and tick resolutions
//! - Session history size
//!
//! Configuration is stored at `~/.config/breathhold/config.toml`.
//! Pattern timings are fixed and not configurable here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use super::database::DEFAULT_HISTORY_LIMIT;
use crate::error::{ConfigError, CoreError, Result};
use crate::timer::PatternVariant;

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub default_variant: PatternVariant,
    /// Pause between the last exhale and the hold.
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,
    #[serde(default = "default_breathing_tick_ms")]
    pub breathing_tick_ms: u64,
    #[serde(default = "default_frame_tick_ms")]
    pub frame_tick_ms: u64,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breathhold/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// Default functions
fn default_transition_delay_ms() -> u64 {
    2_000
}
fn default_breathing_tick_ms() -> u64 {
    100
}
fn default_frame_tick_ms() -> u64 {
    16
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_variant: PatternVariant::default(),
            transition_delay_ms: default_transition_delay_ms(),
            breathing_tick_ms: default_breathing_tick_ms(),
            frame_tick_ms: default_frame_tick_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl SessionConfig {
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn breathing_tick(&self) -> Duration {
        Duration::from_millis(self.breathing_tick_ms.max(1))
    }

    pub fn frame_tick(&self) -> Duration {
        Duration::from_millis(self.frame_tick_ms.max(1))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Config>(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it
    /// (including unknown variant names).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // Same spellings as `--variant`.
        let value = match key {
            "session.default_variant" => value.parse::<PatternVariant>()?.as_str(),
            _ => value,
        };
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config; using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.session.transition_delay_ms, 2_000);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.default_variant").as_deref(), Some("standard"));
        assert_eq!(cfg.get("storage.history_limit").as_deref(), Some("100"));
        assert!(cfg.get("session.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_variant() {
        let mut cfg = Config::default();
        cfg.set("session.transition_delay_ms", "3000").unwrap();
        cfg.set("session.default_variant", "box").unwrap();
        assert_eq!(cfg.session.transition_delay(), Duration::from_secs(3));
        assert_eq!(cfg.session.default_variant, PatternVariant::Box);
    }

    #[test]
    fn set_variant_accepts_cli_spellings() {
        let mut cfg = Config::default();
        cfg.set("session.default_variant", "Box").unwrap();
        assert_eq!(cfg.session.default_variant, PatternVariant::Box);
        cfg.set("session.default_variant", "multihold").unwrap();
        assert_eq!(cfg.session.default_variant, PatternVariant::MultiHold);
        assert_eq!(cfg.get("session.default_variant").as_deref(), Some("multi-hold"));
    }

    #[test]
    fn set_unknown_variant_is_a_validation_error() {
        let mut cfg = Config::default();
        let err = cfg.set("session.default_variant", "square").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnknownVariant(ref name)) if name == "square"
        ));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.nonexistent", "1").is_err());
        assert!(cfg.set("session.transition_delay_ms", "soon").is_err());
        assert!(cfg.set("session.default_variant", "square").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("storage.history_limit", "25").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().storage.history_limit, 25);
    }
}
