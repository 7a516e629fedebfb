//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and rest durations
//! - Auto-start policies consumed by the host
//! - Notification and display toggles
//!
//! Configuration is stored at `<data_dir>/config.toml`. The timer engine
//! never reads it: the host hands the validated durations over through
//! `TimerEngine::update_durations`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::timer::{
    Durations, DEFAULT_REST_MINUTES, DEFAULT_SESSION_MINUTES, REST_MINUTES_MAX, REST_MINUTES_MIN,
    SESSION_MINUTES_MAX, SESSION_MINUTES_MIN,
};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Timer lengths in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_session_duration")]
    pub session_duration_minutes: u32,
    #[serde(default = "default_rest_duration")]
    pub rest_duration_minutes: u32,
}

/// Host orchestration policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Start a rest as soon as a work session completes.
    #[serde(default)]
    pub auto_start_rest: bool,
    /// Start a work session as soon as a rest completes.
    #[serde(default)]
    pub auto_start_work: bool,
    /// Start a work session when the host opens with an idle timer.
    #[serde(default)]
    pub auto_start_on_open: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_icons: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_session_duration() -> u32 {
    DEFAULT_SESSION_MINUTES
}
fn default_rest_duration() -> u32 {
    DEFAULT_REST_MINUTES
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            session_duration_minutes: default_session_duration(),
            rest_duration_minutes: default_rest_duration(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { sound_enabled: true }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { show_icons: true }
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
        if parts.peek().map_or(true, |p| p.is_empty()) {
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
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf value".to_string()));
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

    /// Path of the config file inside the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE_NAME),
            message: e.to_string(),
        })?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
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

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

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
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Change a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save.
    ///
    /// # Errors
    ///
    /// See [`Config::apply`] and [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check the duration bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(
            "timer.session_duration_minutes",
            self.timer.session_duration_minutes,
            SESSION_MINUTES_MIN,
            SESSION_MINUTES_MAX,
        )?;
        check_range(
            "timer.rest_duration_minutes",
            self.timer.rest_duration_minutes,
            REST_MINUTES_MIN,
            REST_MINUTES_MAX,
        )
    }

    /// Durations to hand to the engine. A hand-edited file with values out
    /// of range is clamped rather than rejected.
    pub fn durations(&self) -> Durations {
        Durations::clamped(
            self.timer.session_duration_minutes,
            self.timer.rest_duration_minutes,
        )
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.session_duration_minutes, 25);
        assert_eq!(parsed.timer.rest_duration_minutes, 5);
        assert!(!parsed.behavior.auto_start_rest);
        assert!(parsed.notifications.sound_enabled);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[behavior]\nauto_start_rest = true\n").unwrap();
        assert!(parsed.behavior.auto_start_rest);
        assert!(!parsed.behavior.auto_start_work);
        assert_eq!(parsed.timer.session_duration_minutes, 25);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("display.show_icons").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.session_duration_minutes").as_deref(), Some("25"));
        assert!(cfg.get("display.missing_key").is_none());
        assert!(cfg.get("timer").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("behavior.auto_start_work", "true").unwrap();
        cfg.apply("timer.rest_duration_minutes", "10").unwrap();
        assert!(cfg.behavior.auto_start_work);
        assert_eq!(cfg.timer.rest_duration_minutes, 10);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.nonexistent_key", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("display.show_icons", "not_a_bool").is_err());
        assert!(cfg.apply("timer.session_duration_minutes", "-3").is_err());
    }

    #[test]
    fn apply_rejects_out_of_range_durations() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.session_duration_minutes", "121").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(cfg.apply("timer.rest_duration_minutes", "0").is_err());
        assert_eq!(cfg.timer.session_duration_minutes, 25);
        assert_eq!(cfg.timer.rest_duration_minutes, 5);
    }

    #[test]
    fn durations_clamp_hand_edited_values() {
        let cfg: Config =
            toml::from_str("[timer]\nsession_duration_minutes = 500\nrest_duration_minutes = 0\n")
                .unwrap();
        assert!(cfg.validate().is_err());
        assert_eq!(cfg.durations(), Durations::clamped(120, 1));
    }

    #[test]
    fn load_from_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.session_duration_minutes, 25);
        assert!(path.exists());
    }

    #[test]
    fn load_from_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "timer = [[[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
