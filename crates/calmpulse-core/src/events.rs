use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracker::{BreakActivity, BreakKind, StateKind};

/// Every state change in the tracker produces an Event.
/// The shell subscribes to them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TrackingStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    TrackingStopped {
        session_id: Uuid,
        elapsed_secs: u64,
        breaks: u32,
        at: DateTime<Utc>,
    },
    TrackingPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TrackingResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        kind: BreakKind,
        duration_secs: u64,
        activity: BreakActivity,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero, or the user skipped the rest of the break.
    BreakEnded {
        skipped: bool,
        at: DateTime<Utc>,
    },
    /// Time since the last break reached the configured interval.
    BreakDue {
        since_last_break_secs: u64,
        at: DateTime<Utc>,
    },
    /// Session elapsed time crossed the configured maximum.
    MaxScreenTimeReached {
        elapsed_secs: u64,
        limit_minutes: u32,
        at: DateTime<Utc>,
    },
    /// A pomodoro work session ran its full length.
    PomodoroSessionCompleted {
        session_index: u32,
        at: DateTime<Utc>,
    },
    /// Daily statistics were reset for a new local date.
    DayRolledOver {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: StateKind,
        elapsed_secs: u64,
        time_since_last_break_secs: u64,
        breaks_this_session: u32,
        break_remaining_secs: u64,
        activity: Option<BreakActivity>,
        pomodoro_session: Option<u32>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable name of the variant, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TrackingStarted { .. } => "TrackingStarted",
            Event::TrackingStopped { .. } => "TrackingStopped",
            Event::TrackingPaused { .. } => "TrackingPaused",
            Event::TrackingResumed { .. } => "TrackingResumed",
            Event::BreakStarted { .. } => "BreakStarted",
            Event::BreakEnded { .. } => "BreakEnded",
            Event::BreakDue { .. } => "BreakDue",
            Event::MaxScreenTimeReached { .. } => "MaxScreenTimeReached",
            Event::PomodoroSessionCompleted { .. } => "PomodoroSessionCompleted",
            Event::DayRolledOver { .. } => "DayRolledOver",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_name() {
        let event = Event::BreakEnded {
            skipped: true,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        assert_eq!(json["skipped"], true);
    }
}
