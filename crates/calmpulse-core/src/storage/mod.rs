mod config;
pub mod database;
pub mod settings;
pub mod statistics;

pub use config::AppConfig;
pub use database::{Database, KeyValueStore, MemoryStore};
pub use settings::{SettingField, Settings, SettingsStore};
pub use statistics::{Statistics, StatisticsStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::ConfigError;

/// Returns `~/.config/calmpulse[-dev]/` based on CALMPULSE_ENV.
///
/// Set CALMPULSE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if no home directory can be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or(ConfigError::NoDataDir)?;

    let env = std::env::var("CALMPULSE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("calmpulse-dev")
    } else {
        base_dir.join("calmpulse")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Overlay a stored JSON object onto `defaults`, field by field.
///
/// A field is taken from storage only if the result still deserializes, so a
/// wrong type or a garbled value falls back to the default for that field
/// alone. Anything that is not a JSON object yields `defaults` unchanged.
pub(crate) fn merge_over_defaults<T>(defaults: &T, stored: &str, key: &str) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let stored: serde_json::Value = match serde_json::from_str(stored) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "stored value is not valid JSON, using defaults");
            return defaults.clone();
        }
    };
    let Some(stored) = stored.as_object() else {
        warn!(key, "stored value is not a JSON object, using defaults");
        return defaults.clone();
    };
    let Ok(serde_json::Value::Object(mut merged)) = serde_json::to_value(defaults) else {
        return defaults.clone();
    };

    let fields: Vec<String> = merged.keys().cloned().collect();
    for field in fields {
        let Some(candidate) = stored.get(&field) else {
            continue;
        };
        let previous = merged.insert(field.clone(), candidate.clone());
        let accepted =
            serde_json::from_value::<T>(serde_json::Value::Object(merged.clone())).is_ok();
        if !accepted {
            warn!(key, field = %field, "ignoring invalid stored field");
            if let Some(previous) = previous {
                merged.insert(field, previous);
            }
        }
    }

    serde_json::from_value(serde_json::Value::Object(merged)).unwrap_or_else(|_| defaults.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        label: String,
    }

    fn defaults() -> Sample {
        Sample {
            count: 7,
            label: "seven".into(),
        }
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(merge_over_defaults(&defaults(), "{not json", "k"), defaults());
        assert_eq!(merge_over_defaults(&defaults(), "[1, 2]", "k"), defaults());
    }

    #[test]
    fn invalid_field_keeps_default_valid_field_is_taken() {
        let merged = merge_over_defaults(&defaults(), r#"{"count": "lots", "label": "x"}"#, "k");
        assert_eq!(merged.count, 7);
        assert_eq!(merged.label, "x");
    }

    #[test]
    fn missing_and_unknown_fields_are_tolerated() {
        let merged = merge_over_defaults(&defaults(), r#"{"count": 3, "extra": true}"#, "k");
        assert_eq!(merged, Sample { count: 3, label: "seven".into() });
    }
}
