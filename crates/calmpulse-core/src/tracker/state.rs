use serde::{Deserialize, Serialize};

use super::activity::BreakActivity;

/// Why a break was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    /// Requested by the user.
    Manual,
    /// Pomodoro short break.
    Short,
    /// Pomodoro long break at the end of a cycle.
    Long,
}

/// The single source of truth for what the tracker is doing.
///
/// Break data only exists while on a break, so a countdown without a break
/// (or a break without an activity) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrackerState {
    Idle,
    Tracking,
    Paused,
    OnBreak {
        remaining_secs: u64,
        activity: BreakActivity,
        kind: BreakKind,
    },
}

/// Payload-free discriminant of [`TrackerState`], for events and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Idle,
    Tracking,
    Paused,
    OnBreak,
}

impl TrackerState {
    pub fn kind(&self) -> StateKind {
        match self {
            TrackerState::Idle => StateKind::Idle,
            TrackerState::Tracking => StateKind::Tracking,
            TrackerState::Paused => StateKind::Paused,
            TrackerState::OnBreak { .. } => StateKind::OnBreak,
        }
    }

    pub fn is_on_break(&self) -> bool {
        matches!(self, TrackerState::OnBreak { .. })
    }

    /// Seconds left on the break countdown; zero outside a break.
    pub fn break_remaining_secs(&self) -> u64 {
        match self {
            TrackerState::OnBreak { remaining_secs, .. } => *remaining_secs,
            _ => 0,
        }
    }

    pub fn activity(&self) -> Option<BreakActivity> {
        match self {
            TrackerState::OnBreak { activity, .. } => Some(*activity),
            _ => None,
        }
    }
}

impl StateKind {
    pub fn label(self) -> &'static str {
        match self {
            StateKind::Idle => "Idle",
            StateKind::Tracking => "Tracking",
            StateKind::Paused => "Paused",
            StateKind::OnBreak => "On Break",
        }
    }
}

/// Per-session counters, reset on every `start()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingSession {
    /// Seconds tracked while neither paused nor on a break.
    pub elapsed_secs: u64,
    /// Seconds tracked since the last break started.
    pub time_since_last_break_secs: u64,
    pub breaks_this_session: u32,
    /// Elapsed time is at or above the configured maximum.
    #[serde(skip)]
    pub(crate) over_limit: bool,
    /// Break reminder already sent since the last break.
    #[serde(skip)]
    pub(crate) break_due_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_fields_only_exist_on_break() {
        assert_eq!(TrackerState::Tracking.break_remaining_secs(), 0);
        assert!(TrackerState::Paused.activity().is_none());

        let on_break = TrackerState::OnBreak {
            remaining_secs: 42,
            activity: BreakActivity::Walk,
            kind: BreakKind::Manual,
        };
        assert!(on_break.is_on_break());
        assert_eq!(on_break.break_remaining_secs(), 42);
        assert_eq!(on_break.activity(), Some(BreakActivity::Walk));
        assert_eq!(on_break.kind(), StateKind::OnBreak);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(TrackerState::OnBreak {
            remaining_secs: 5,
            activity: BreakActivity::EyeRest,
            kind: BreakKind::Long,
        })
        .unwrap();
        assert_eq!(json["state"], "on_break");
        assert_eq!(json["kind"], "long");
        assert_eq!(json["activity"], "eye_rest");
    }
}
