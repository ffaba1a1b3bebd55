//! # Calm Pulse Core Library
//!
//! Screen-time tracking with break prompts, an optional pomodoro cycle,
//! persisted daily statistics and a rule-based risk evaluation. The
//! `calmpulse` binary is a thin interactive shell over this crate.
//!
//! ## Architecture
//!
//! - **Tracker**: a tick-driven state machine. The caller invokes `tick()`
//!   once per second; [`TrackerService`] does that from a background task.
//! - **Storage**: settings, pomodoro state and statistics as JSON values in a
//!   SQLite key-value table, plus a TOML file for process configuration
//! - **Risk**: tier and recommendation lines derived from the live session
//! - **Advisory**: optional call to an external burnout prediction service
//!
//! ## Key Components
//!
//! - [`TrackingEngine`]: core state machine
//! - [`TrackerService`]: async runtime owning the engine and tick source
//! - [`Database`]: key-value persistence
//! - [`AppConfig`]: application configuration

pub mod advisory;
pub mod error;
pub mod events;
pub mod notify;
pub mod risk;
pub mod service;
pub mod storage;
pub mod ticker;
pub mod tracker;

pub use advisory::{BurnoutClient, BurnoutPrediction, BurnoutRequest, BurnoutRisk};
pub use error::{AdvisoryError, ConfigError, CoreError, NotifyError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use risk::{Assessment, RiskTier};
pub use service::{TrackerHandle, TrackerService};
pub use storage::{AppConfig, Database, KeyValueStore, MemoryStore, Settings, Statistics};
pub use ticker::{Tick, TickSource};
pub use tracker::{
    BreakActivity, BreakKind, PomodoroConfig, StateKind, TrackerState, TrackingEngine,
    TrackingSession,
};
