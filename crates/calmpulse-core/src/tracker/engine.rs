//! Tracking engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no timer of its own;
//! whoever drives it calls `tick()` once per second and the engine reacts
//! according to its current state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Tracking <-> Paused
//!         Tracking -> OnBreak -> Tracking
//! (any non-Idle) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TrackingEngine::open(store, notifier);
//! engine.start();
//! // Once per second:
//! let events = engine.tick();
//! ```

use chrono::{Local, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::activity::BreakActivity;
use super::pomodoro::PomodoroConfig;
use super::state::{BreakKind, TrackerState, TrackingSession};
use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::{NotificationGateway, Notifier};
use crate::risk::{self, Assessment, BreakStatus};
use crate::storage::{KeyValueStore, Settings, SettingsStore, Statistics, StatisticsStore};

/// Statistics are written back every this many tracked seconds.
pub const STATS_FLUSH_TICKS: u64 = 30;

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Core tracking engine.
///
/// Owns the session counters and the working copy of settings, pomodoro cycle
/// and statistics. Nothing else mutates them.
pub struct TrackingEngine {
    state: TrackerState,
    session: TrackingSession,
    session_id: Uuid,
    settings: Settings,
    pomodoro: PomodoroConfig,
    stats: Statistics,
    settings_store: SettingsStore,
    stats_store: StatisticsStore,
    gateway: NotificationGateway,
    rng: StdRng,
    today: Clock,
}

impl TrackingEngine {
    /// Create an engine from explicit stores, loading persisted state.
    ///
    /// Starts in the `Idle` state.
    pub fn new(
        settings_store: SettingsStore,
        stats_store: StatisticsStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let settings = settings_store.load();
        let mut pomodoro = settings_store.load_pomodoro();
        pomodoro.enabled = settings.pomodoro_enabled;
        let stats = stats_store.load();
        Self {
            state: TrackerState::Idle,
            session: TrackingSession::default(),
            session_id: Uuid::nil(),
            settings,
            pomodoro,
            stats,
            settings_store,
            stats_store,
            gateway: NotificationGateway::new(notifier),
            rng: StdRng::from_entropy(),
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Create an engine whose settings and statistics share one key-value store.
    pub fn open(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            SettingsStore::new(store.clone()),
            StatisticsStore::new(store),
            notifier,
        )
    }

    /// Make break activity selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the source of the local date and reload statistics against it.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self.stats = self.stats_store.load_on((self.today)());
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pomodoro(&self) -> &PomodoroConfig {
        &self.pomodoro
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn break_remaining_secs(&self) -> u64 {
        self.state.break_remaining_secs()
    }

    pub fn current_activity(&self) -> Option<BreakActivity> {
        self.state.activity()
    }

    /// Risk tier and recommendations for the current moment.
    pub fn assess(&self) -> Assessment {
        let on_break = match self.state {
            TrackerState::OnBreak {
                remaining_secs,
                activity,
                ..
            } => Some(BreakStatus {
                activity,
                remaining_secs,
            }),
            _ => None,
        };
        risk::evaluate(self.session.elapsed_secs, &self.settings, &self.stats, on_break)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state.kind(),
            elapsed_secs: self.session.elapsed_secs,
            time_since_last_break_secs: self.session.time_since_last_break_secs,
            breaks_this_session: self.session.breaks_this_session,
            break_remaining_secs: self.state.break_remaining_secs(),
            activity: self.state.activity(),
            pomodoro_session: self
                .pomodoro
                .enabled
                .then_some(self.pomodoro.current_session_index),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state != TrackerState::Idle {
            return None;
        }
        self.refresh_day();
        self.session = TrackingSession::default();
        self.session_id = Uuid::new_v4();
        self.state = TrackerState::Tracking;
        info!(session_id = %self.session_id, "tracking started");
        self.notify("Tracking Started", "Screen time tracking has begun.", false);
        Some(Event::TrackingStarted {
            session_id: self.session_id,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        if self.state == TrackerState::Idle {
            return None;
        }
        self.state = TrackerState::Idle;
        self.save_stats();
        info!(
            session_id = %self.session_id,
            elapsed_secs = self.session.elapsed_secs,
            "tracking stopped"
        );
        self.notify("Tracking Stopped", "Screen time tracking has stopped.", false);
        Some(Event::TrackingStopped {
            session_id: self.session_id,
            elapsed_secs: self.session.elapsed_secs,
            breaks: self.session.breaks_this_session,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TrackerState::Tracking {
            return None;
        }
        self.state = TrackerState::Paused;
        self.save_stats();
        Some(Event::TrackingPaused {
            elapsed_secs: self.session.elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TrackerState::Paused {
            return None;
        }
        self.refresh_day();
        self.state = TrackerState::Tracking;
        Some(Event::TrackingResumed {
            elapsed_secs: self.session.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// User-requested break of `break_duration_minutes`.
    pub fn start_break(&mut self) -> Option<Event> {
        if self.state != TrackerState::Tracking {
            return None;
        }
        self.refresh_day();
        let duration_secs = u64::from(self.settings.break_duration_minutes) * 60;
        Some(self.begin_break(BreakKind::Manual, duration_secs))
    }

    /// Cut the current break short.
    pub fn skip_break(&mut self) -> Option<Event> {
        if !self.state.is_on_break() {
            return None;
        }
        Some(self.end_break(true))
    }

    /// Call once per second. Returns the events the tick produced.
    ///
    /// Ticks while `Idle` or `Paused` change nothing.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        match self.state {
            TrackerState::Idle | TrackerState::Paused => {}
            TrackerState::Tracking => {
                events.extend(self.refresh_day());
                self.tick_tracking(&mut events);
            }
            TrackerState::OnBreak {
                remaining_secs,
                activity,
                kind,
            } => {
                events.extend(self.refresh_day());
                let remaining_secs = remaining_secs.saturating_sub(1);
                if remaining_secs == 0 {
                    events.push(self.end_break(false));
                } else {
                    self.state = TrackerState::OnBreak {
                        remaining_secs,
                        activity,
                        kind,
                    };
                }
            }
        }
        events
    }

    /// Reset the daily statistics if the local date moved on since they were
    /// last touched. Ticks and commands call this themselves; callers only
    /// need it before reading [`TrackingEngine::statistics`] or
    /// [`TrackingEngine::assess`] after a quiet spell.
    pub fn refresh_day(&mut self) -> Option<Event> {
        let today = (self.today)();
        if !self.stats.roll_over(today) {
            return None;
        }
        info!(date = %today, "new day, daily statistics reset");
        self.save_stats();
        Some(Event::DayRolledOver {
            date: today,
            at: Utc::now(),
        })
    }

    /// Apply one settings edit and persist it. On error nothing changes.
    pub fn update_setting(&mut self, field: &str, value: &str) -> Result<&Settings, ValidationError> {
        let mut edited = self.settings.clone();
        edited.apply_edit(field, value)?;
        self.replace_settings(edited);
        Ok(&self.settings)
    }

    /// Swap in an already validated settings struct and persist it.
    pub fn replace_settings(&mut self, settings: Settings) {
        let pomodoro_toggled = settings.pomodoro_enabled != self.pomodoro.enabled;
        if settings.max_screen_time_minutes != self.settings.max_screen_time_minutes {
            // Only an already announced crossing stays announced. A lower
            // limit that is already exceeded is reported on the next tick.
            self.session.over_limit = self.session.over_limit
                && self.session.elapsed_secs >= u64::from(settings.max_screen_time_minutes) * 60;
        }
        self.settings = settings;
        if let Err(e) = self.settings_store.save(&self.settings) {
            warn!(error = %e, "failed to save settings");
        }
        if pomodoro_toggled {
            self.pomodoro.enabled = self.settings.pomodoro_enabled;
            self.save_pomodoro();
        }
    }

    /// Apply one pomodoro edit and persist it. On error nothing changes.
    pub fn update_pomodoro(
        &mut self,
        field: &str,
        value: &str,
    ) -> Result<&PomodoroConfig, ValidationError> {
        let mut edited = self.pomodoro.clone();
        edited.apply_edit(field, value)?;
        self.pomodoro = edited;
        self.save_pomodoro();
        Ok(&self.pomodoro)
    }

    /// Persist everything the engine holds. Called on shutdown.
    pub fn flush(&self) {
        self.save_stats();
        self.save_pomodoro();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_tracking(&mut self, events: &mut Vec<Event>) {
        let today = (self.today)();
        self.session.elapsed_secs += 1;
        self.session.time_since_last_break_secs += 1;
        self.stats.record_tick(self.session.elapsed_secs, today);
        if self.session.elapsed_secs % STATS_FLUSH_TICKS == 0 {
            self.save_stats();
        }

        let limit_minutes = self.settings.max_screen_time_minutes;
        let over_limit = self.session.elapsed_secs >= u64::from(limit_minutes) * 60;
        if over_limit && !self.session.over_limit {
            info!(elapsed_secs = self.session.elapsed_secs, limit_minutes, "maximum screen time reached");
            self.notify(
                "Maximum Screen Time Reached!",
                "You've reached your maximum screen time limit. Consider taking a longer break.",
                true,
            );
            events.push(Event::MaxScreenTimeReached {
                elapsed_secs: self.session.elapsed_secs,
                limit_minutes,
                at: Utc::now(),
            });
        }
        self.session.over_limit = over_limit;

        if self.pomodoro.enabled {
            if self.session.time_since_last_break_secs >= self.pomodoro.work_secs() {
                let session_index = self.pomodoro.current_session_index;
                let kind = self.pomodoro.complete_session();
                self.save_pomodoro();
                events.push(Event::PomodoroSessionCompleted {
                    session_index,
                    at: Utc::now(),
                });
                let duration_secs = self.pomodoro.break_secs(kind);
                events.push(self.begin_break(kind, duration_secs));
            }
            return;
        }

        let interval_secs = u64::from(self.settings.break_interval_minutes) * 60;
        if !self.session.break_due_sent && self.session.time_since_last_break_secs >= interval_secs
        {
            self.session.break_due_sent = true;
            let body = self.break_due_body();
            self.notify("Time for a Break", &body, false);
            events.push(Event::BreakDue {
                since_last_break_secs: self.session.time_since_last_break_secs,
                at: Utc::now(),
            });
        }
    }

    fn begin_break(&mut self, kind: BreakKind, duration_secs: u64) -> Event {
        let today = (self.today)();
        let activity = BreakActivity::random(&mut self.rng);
        self.session.breaks_this_session += 1;
        self.session.time_since_last_break_secs = 0;
        self.session.break_due_sent = false;
        self.stats.record_break(today);
        self.save_stats();
        self.state = TrackerState::OnBreak {
            remaining_secs: duration_secs,
            activity,
            kind,
        };
        debug!(?kind, duration_secs, activity = activity.kind(), "break started");
        let body = format!(
            "Taking a {} minute break. {}",
            duration_secs / 60,
            activity.description()
        );
        self.notify("Break Started", &body, true);
        Event::BreakStarted {
            kind,
            duration_secs,
            activity,
            at: Utc::now(),
        }
    }

    fn end_break(&mut self, skipped: bool) -> Event {
        self.state = TrackerState::Tracking;
        debug!(skipped, "break ended");
        if skipped {
            self.notify(
                "Break Skipped",
                "Break skipped. Try to take your next break on time!",
                false,
            );
        } else {
            self.notify(
                "Break Time Over!",
                "Time to get back to work. Remember to maintain good posture!",
                true,
            );
        }
        Event::BreakEnded {
            skipped,
            at: Utc::now(),
        }
    }

    fn break_due_body(&self) -> String {
        let mut body = format!(
            "You've been on screen for {} since your last break.",
            risk::format_time(self.session.time_since_last_break_secs)
        );
        if self.settings.water_reminders {
            body.push_str(" Grab some water.");
        }
        if self.settings.exercise_reminders {
            body.push_str(" Stand up and stretch.");
        }
        body
    }

    fn notify(&self, title: &str, body: &str, urgent: bool) {
        self.gateway.send(&self.settings, title, body, urgent);
    }

    fn save_stats(&self) {
        if let Err(e) = self.stats_store.save(&self.stats) {
            warn!(error = %e, "failed to save statistics");
        }
    }

    fn save_pomodoro(&self) {
        if let Err(e) = self.settings_store.save_pomodoro(&self.pomodoro) {
            warn!(error = %e, "failed to save pomodoro state");
        }
    }
}
