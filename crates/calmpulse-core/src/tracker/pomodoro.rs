use serde::{Deserialize, Serialize};

use super::state::BreakKind;
use crate::error::ValidationError;
use crate::storage::settings::parse_minutes;

/// Work/break alternation layered on top of tracking.
///
/// `current_session_index` counts completed work sessions and wraps at
/// `sessions_before_long_break`; the session that wraps it earns a long break.
/// `enabled` mirrors the `pomodoro` user setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroConfig {
    pub enabled: bool,
    pub work_duration_minutes: u32,
    pub break_duration_minutes: u32,
    pub long_break_duration_minutes: u32,
    pub sessions_before_long_break: u32,
    pub current_session_index: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            work_duration_minutes: 25,
            break_duration_minutes: 5,
            long_break_duration_minutes: 15,
            sessions_before_long_break: 4,
            current_session_index: 0,
        }
    }
}

impl PomodoroConfig {
    /// Work session length in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn work_secs(&self) -> u64 {
        u64::from(self.work_duration_minutes).saturating_mul(60)
    }

    /// Break length in seconds for the given kind. Manual breaks are not
    /// governed by the cycle and fall back to the short break.
    pub fn break_secs(&self, kind: BreakKind) -> u64 {
        let minutes = match kind {
            BreakKind::Long => self.long_break_duration_minutes,
            BreakKind::Short | BreakKind::Manual => self.break_duration_minutes,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// Whether the session now in progress is the last one before a long break.
    pub fn long_break_next(&self) -> bool {
        self.current_session_index + 1 >= self.sessions_before_long_break.max(1)
    }

    /// Close the current work session and advance the index.
    ///
    /// Returns the kind of break the completed session earned.
    pub fn complete_session(&mut self) -> BreakKind {
        let kind = if self.long_break_next() {
            BreakKind::Long
        } else {
            BreakKind::Short
        };
        self.current_session_index =
            (self.current_session_index + 1) % self.sessions_before_long_break.max(1);
        kind
    }

    /// Apply one user edit. On error nothing changes.
    pub fn apply_edit(&mut self, field: &str, raw: &str) -> Result<(), ValidationError> {
        let normalized = field.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "work" | "work-duration" => {
                self.work_duration_minutes = parse_minutes("work-duration", raw, 1)?
            }
            "break" | "break-duration" => {
                self.break_duration_minutes = parse_minutes("break-duration", raw, 1)?
            }
            "long-break" | "long-break-duration" => {
                self.long_break_duration_minutes = parse_minutes("long-break-duration", raw, 5)?
            }
            "sessions" | "sessions-before-long-break" => {
                self.sessions_before_long_break =
                    parse_minutes("sessions-before-long-break", raw, 1)?;
                self.current_session_index %= self.sessions_before_long_break;
            }
            _ => return Err(ValidationError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    /// Repair values that came from storage rather than through an edit.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.work_duration_minutes == 0 {
            self.work_duration_minutes = defaults.work_duration_minutes;
        }
        if self.break_duration_minutes == 0 {
            self.break_duration_minutes = defaults.break_duration_minutes;
        }
        if self.long_break_duration_minutes < 5 {
            self.long_break_duration_minutes = defaults.long_break_duration_minutes;
        }
        if self.sessions_before_long_break == 0 {
            self.sessions_before_long_break = defaults.sessions_before_long_break;
        }
        self.current_session_index %= self.sessions_before_long_break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_session_earns_long_break_and_wraps() {
        let mut p = PomodoroConfig::default();
        assert_eq!(p.complete_session(), BreakKind::Short);
        assert_eq!(p.complete_session(), BreakKind::Short);
        assert_eq!(p.complete_session(), BreakKind::Short);
        assert_eq!(p.current_session_index, 3);
        assert!(p.long_break_next());
        assert_eq!(p.complete_session(), BreakKind::Long);
        assert_eq!(p.current_session_index, 0);
    }

    #[test]
    fn single_session_cycle_is_always_long() {
        let mut p = PomodoroConfig {
            sessions_before_long_break: 1,
            ..PomodoroConfig::default()
        };
        assert_eq!(p.complete_session(), BreakKind::Long);
        assert_eq!(p.current_session_index, 0);
    }

    #[test]
    fn durations_in_seconds() {
        let p = PomodoroConfig::default();
        assert_eq!(p.work_secs(), 25 * 60);
        assert_eq!(p.break_secs(BreakKind::Short), 5 * 60);
        assert_eq!(p.break_secs(BreakKind::Long), 15 * 60);
    }

    #[test]
    fn edits_validate_minimums() {
        let mut p = PomodoroConfig::default();
        p.apply_edit("work", "50").unwrap();
        assert_eq!(p.work_duration_minutes, 50);
        assert!(p.apply_edit("long-break", "2").is_err());
        assert!(p.apply_edit("sessions", "0").is_err());
        assert!(p.apply_edit("colour", "red").is_err());
        assert_eq!(p.long_break_duration_minutes, 15);
        assert_eq!(p.sessions_before_long_break, 4);
    }

    #[test]
    fn shrinking_cycle_keeps_index_in_range() {
        let mut p = PomodoroConfig {
            current_session_index: 3,
            ..PomodoroConfig::default()
        };
        p.apply_edit("sessions", "2").unwrap();
        assert!(p.current_session_index < 2);
    }
}
