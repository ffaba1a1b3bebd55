mod activity;
mod engine;
mod pomodoro;
mod state;

pub use activity::BreakActivity;
pub use engine::{TrackingEngine, STATS_FLUSH_TICKS};
pub use pomodoro::PomodoroConfig;
pub use state::{BreakKind, StateKind, TrackerState, TrackingSession};
