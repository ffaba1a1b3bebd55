//! TOML-based application configuration.
//!
//! Holds process-level knobs that are not user wellbeing settings:
//! - Burnout prediction endpoint and request timeout
//! - Tick interval
//! - Log filter
//! - Database file name
//!
//! Configuration is stored at `~/.config/calmpulse/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Application configuration.
///
/// Serialized to/from TOML; every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_advisory_endpoint")]
    pub advisory_endpoint: String,
    #[serde(default = "default_advisory_timeout_secs")]
    pub advisory_timeout_secs: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_advisory_endpoint() -> String {
    "http://localhost:5001/predict".into()
}
fn default_advisory_timeout_secs() -> u64 {
    10
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_log_filter() -> String {
    "info".into()
}
fn default_database_file() -> String {
    "calmpulse.db".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            advisory_endpoint: default_advisory_endpoint(),
            advisory_timeout_secs: default_advisory_timeout_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            log_filter: default_log_filter(),
            database_file: default_database_file(),
        }
    }
}

impl AppConfig {
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
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
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
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load from `path`, writing and returning the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
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

    /// Set a config value by key in memory. Call [`AppConfig::save_to`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: AppConfig = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Every top-level key with its display value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let Ok(serde_json::Value::Object(map)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        map.into_iter()
            .map(|(key, value)| {
                let shown = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, shown)
            })
            .collect()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn advisory_timeout(&self) -> Duration {
        Duration::from_secs(self.advisory_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: AppConfig = toml::from_str("tick_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.tick_interval_ms, 250);
        assert_eq!(parsed.advisory_endpoint, "http://localhost:5001/predict");
        assert_eq!(parsed.log_filter, "info");
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("log_filter").as_deref(), Some("info"));
        assert!(cfg.get("missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = AppConfig::default();
        cfg.set("advisory_timeout_secs", "3").unwrap();
        cfg.set("advisory_endpoint", "http://127.0.0.1:9000/predict").unwrap();
        assert_eq!(cfg.advisory_timeout_secs, 3);
        assert_eq!(cfg.advisory_endpoint, "http://127.0.0.1:9000/predict");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_number() {
        let mut cfg = AppConfig::default();
        assert!(matches!(
            cfg.set("nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("tick_interval_ms", "fast"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("tick_interval_ms", "0").is_err());
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn entries_list_every_key() {
        let keys: Vec<String> = AppConfig::default()
            .entries()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys.len(), 5);
        for key in &keys {
            assert!(AppConfig::default().get(key).is_some(), "{key}");
        }
        assert!(AppConfig::default()
            .entries()
            .contains(&("tick_interval_ms".to_string(), "1000".to_string())));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = AppConfig::path_in(dir.path());
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = AppConfig::path_in(dir.path());
        std::fs::write(&path, "tick_interval_ms = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
