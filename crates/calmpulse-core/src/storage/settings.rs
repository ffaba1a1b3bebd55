//! User settings and their store.
//!
//! Settings live in the key-value store under [`SETTINGS_KEY`] as a flat
//! camelCase JSON object. Loading merges whatever is stored over the built-in
//! defaults; editing goes through [`Settings::apply_edit`], which rejects a bad
//! value and leaves the previous one in place.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use super::database::KeyValueStore;
use super::merge_over_defaults;
use crate::error::{Result, ValidationError};
use crate::tracker::PomodoroConfig;

pub const SETTINGS_KEY: &str = "settings";
pub const POMODORO_KEY: &str = "pomodoro";

/// User-configurable thresholds and feature toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub max_screen_time_minutes: u32,
    pub break_interval_minutes: u32,
    pub break_duration_minutes: u32,
    pub daily_goal_minutes: u32,
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub pomodoro_enabled: bool,
    pub water_reminders: bool,
    pub exercise_reminders: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_screen_time_minutes: 120,
            break_interval_minutes: 30,
            break_duration_minutes: 5,
            daily_goal_minutes: 480,
            notifications_enabled: true,
            sound_enabled: true,
            pomodoro_enabled: false,
            water_reminders: true,
            exercise_reminders: true,
        }
    }
}

/// Editable settings fields, addressed by their kebab-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    MaxScreenTime,
    BreakInterval,
    BreakDuration,
    DailyGoal,
    Notifications,
    Sound,
    Pomodoro,
    WaterReminders,
    ExerciseReminders,
}

impl SettingField {
    pub const ALL: [SettingField; 9] = [
        SettingField::MaxScreenTime,
        SettingField::BreakInterval,
        SettingField::BreakDuration,
        SettingField::DailyGoal,
        SettingField::Notifications,
        SettingField::Sound,
        SettingField::Pomodoro,
        SettingField::WaterReminders,
        SettingField::ExerciseReminders,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingField::MaxScreenTime => "max-screen-time",
            SettingField::BreakInterval => "break-interval",
            SettingField::BreakDuration => "break-duration",
            SettingField::DailyGoal => "daily-goal",
            SettingField::Notifications => "notifications",
            SettingField::Sound => "sound",
            SettingField::Pomodoro => "pomodoro",
            SettingField::WaterReminders => "water-reminders",
            SettingField::ExerciseReminders => "exercise-reminders",
        }
    }

    /// Lowest accepted value for numeric fields, in minutes.
    pub fn minimum(self) -> Option<u32> {
        match self {
            SettingField::MaxScreenTime => Some(30),
            SettingField::BreakInterval => Some(15),
            SettingField::BreakDuration => Some(1),
            SettingField::DailyGoal => Some(60),
            _ => None,
        }
    }
}

impl FromStr for SettingField {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        SettingField::ALL
            .into_iter()
            .find(|field| {
                field.name() == normalized
                    || field.name().replace('-', "") == normalized.replace('-', "")
            })
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

impl Settings {
    /// Apply one user edit. On error nothing changes.
    pub fn apply_edit(&mut self, field: &str, raw: &str) -> std::result::Result<(), ValidationError> {
        let field: SettingField = field.parse()?;
        let name = field.name();
        match field {
            SettingField::MaxScreenTime => {
                self.max_screen_time_minutes = parse_minutes(name, raw, 30)?
            }
            SettingField::BreakInterval => {
                self.break_interval_minutes = parse_minutes(name, raw, 15)?
            }
            SettingField::BreakDuration => {
                self.break_duration_minutes = parse_minutes(name, raw, 1)?
            }
            SettingField::DailyGoal => self.daily_goal_minutes = parse_minutes(name, raw, 60)?,
            SettingField::Notifications => self.notifications_enabled = parse_toggle(name, raw)?,
            SettingField::Sound => self.sound_enabled = parse_toggle(name, raw)?,
            SettingField::Pomodoro => self.pomodoro_enabled = parse_toggle(name, raw)?,
            SettingField::WaterReminders => self.water_reminders = parse_toggle(name, raw)?,
            SettingField::ExerciseReminders => {
                self.exercise_reminders = parse_toggle(name, raw)?
            }
        }
        Ok(())
    }

    /// Display form of one field: minutes as a number, toggles as `on`/`off`.
    pub fn value_of(&self, field: SettingField) -> String {
        let toggle = |on: bool| (if on { "on" } else { "off" }).to_string();
        match field {
            SettingField::MaxScreenTime => self.max_screen_time_minutes.to_string(),
            SettingField::BreakInterval => self.break_interval_minutes.to_string(),
            SettingField::BreakDuration => self.break_duration_minutes.to_string(),
            SettingField::DailyGoal => self.daily_goal_minutes.to_string(),
            SettingField::Notifications => toggle(self.notifications_enabled),
            SettingField::Sound => toggle(self.sound_enabled),
            SettingField::Pomodoro => toggle(self.pomodoro_enabled),
            SettingField::WaterReminders => toggle(self.water_reminders),
            SettingField::ExerciseReminders => toggle(self.exercise_reminders),
        }
    }

    /// Reset any numeric field below its minimum to the default.
    ///
    /// Only needed for values that bypassed [`Settings::apply_edit`], i.e. storage.
    pub fn sanitize(&mut self) {
        let defaults = Settings::default();
        if self.max_screen_time_minutes < 30 {
            self.max_screen_time_minutes = defaults.max_screen_time_minutes;
        }
        if self.break_interval_minutes < 15 {
            self.break_interval_minutes = defaults.break_interval_minutes;
        }
        if self.break_duration_minutes < 1 {
            self.break_duration_minutes = defaults.break_duration_minutes;
        }
        if self.daily_goal_minutes < 60 {
            self.daily_goal_minutes = defaults.daily_goal_minutes;
        }
    }
}

/// Parse a positive whole number of minutes no smaller than `minimum`.
pub fn parse_minutes(
    field: &str,
    raw: &str,
    minimum: u32,
) -> std::result::Result<u32, ValidationError> {
    let value: u32 = raw.trim().parse().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
        value: raw.to_string(),
    })?;
    if value < minimum.max(1) {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            minimum: minimum.max(1),
            value,
        });
    }
    Ok(value)
}

/// Parse an on/off word.
pub fn parse_toggle(field: &str, raw: &str) -> std::result::Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ValidationError::NotABoolean {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Loads and saves [`Settings`] and [`PomodoroConfig`].
///
/// Accepts whatever it is given on save; validation happens at the edit boundary.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored settings merged over defaults. Never fails.
    pub fn load(&self) -> Settings {
        let mut settings = load_merged(self.store.as_ref(), SETTINGS_KEY, &Settings::default());
        settings.sanitize();
        settings
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_KEY, &json)?;
        Ok(())
    }

    /// Stored pomodoro cycle merged over defaults. Never fails.
    pub fn load_pomodoro(&self) -> PomodoroConfig {
        let mut pomodoro =
            load_merged(self.store.as_ref(), POMODORO_KEY, &PomodoroConfig::default());
        pomodoro.sanitize();
        pomodoro
    }

    pub fn save_pomodoro(&self, pomodoro: &PomodoroConfig) -> Result<()> {
        let json = serde_json::to_string(pomodoro)?;
        self.store.set(POMODORO_KEY, &json)?;
        Ok(())
    }
}

pub(crate) fn load_merged<T>(store: &dyn KeyValueStore, key: &str, defaults: &T) -> T
where
    T: Serialize + serde::de::DeserializeOwned + Clone,
{
    match store.get(key) {
        Ok(Some(raw)) => merge_over_defaults(defaults, &raw, key),
        Ok(None) => defaults.clone(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored value, using defaults");
            defaults.clone()
        }
    }
}
