//! Cumulative screen-time statistics.
//!
//! Daily counters reset when the local date changes; weekly screen time and the
//! longest session survive the rollover. Only the tracking engine mutates a
//! [`Statistics`] value, through [`Statistics::record_tick`] and
//! [`Statistics::record_break`].

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::database::KeyValueStore;
use super::settings::load_merged;
use crate::error::Result;

pub const STATISTICS_KEY: &str = "statistics";

/// Persisted daily/weekly aggregates. All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub daily_screen_time: u64,
    pub weekly_screen_time: u64,
    pub total_breaks_today: u32,
    pub average_session_length: u64,
    pub longest_session_seconds: u64,
    pub last_update_date: NaiveDate,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::empty_on(Local::now().date_naive())
    }
}

impl Statistics {
    pub fn empty_on(date: NaiveDate) -> Self {
        Self {
            daily_screen_time: 0,
            weekly_screen_time: 0,
            total_breaks_today: 0,
            average_session_length: 0,
            longest_session_seconds: 0,
            last_update_date: date,
        }
    }

    /// Reset the daily counters if `today` differs from the last update date.
    ///
    /// Returns `true` when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_update_date == today {
            return false;
        }
        debug!(from = %self.last_update_date, to = %today, "daily statistics rollover");
        self.daily_screen_time = 0;
        self.total_breaks_today = 0;
        self.last_update_date = today;
        self.recompute_average();
        true
    }

    /// One tracked second. `session_elapsed` is the session length after the tick.
    ///
    /// Rolls over first, so a stale date never absorbs today's time.
    pub fn record_tick(&mut self, session_elapsed: u64, today: NaiveDate) {
        self.roll_over(today);
        self.daily_screen_time += 1;
        self.weekly_screen_time += 1;
        self.longest_session_seconds = self.longest_session_seconds.max(session_elapsed);
        self.recompute_average();
    }

    /// One break started. Rolls over first, like [`Statistics::record_tick`].
    pub fn record_break(&mut self, today: NaiveDate) {
        self.roll_over(today);
        self.total_breaks_today += 1;
        self.recompute_average();
    }

    /// `daily_screen_time / max(total_breaks_today, 1)`, used by every caller.
    fn recompute_average(&mut self) {
        self.average_session_length =
            self.daily_screen_time / u64::from(self.total_breaks_today.max(1));
    }
}

/// Loads and saves [`Statistics`] in the key-value store.
#[derive(Clone)]
pub struct StatisticsStore {
    store: Arc<dyn KeyValueStore>,
}

impl StatisticsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored statistics with the daily rollover applied for the local date.
    pub fn load(&self) -> Statistics {
        self.load_on(Local::now().date_naive())
    }

    /// Stored statistics with the daily rollover applied for `today`.
    ///
    /// Missing or malformed storage yields empty statistics dated `today`.
    pub fn load_on(&self, today: NaiveDate) -> Statistics {
        let mut stats = load_merged(
            self.store.as_ref(),
            STATISTICS_KEY,
            &Statistics::empty_on(today),
        );
        stats.roll_over(today);
        stats
    }

    pub fn save(&self, stats: &Statistics) -> Result<()> {
        let json = serde_json::to_string(stats)?;
        self.store.set(STATISTICS_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn record_tick_updates_all_counters() {
        let mut stats = Statistics::empty_on(day(2));
        for elapsed in 1..=90 {
            stats.record_tick(elapsed, day(2));
        }
        assert_eq!(stats.daily_screen_time, 90);
        assert_eq!(stats.weekly_screen_time, 90);
        assert_eq!(stats.longest_session_seconds, 90);
        assert_eq!(stats.average_session_length, 90);
    }

    #[test]
    fn longest_session_keeps_maximum() {
        let mut stats = Statistics::empty_on(day(2));
        stats.longest_session_seconds = 500;
        stats.record_tick(3, day(2));
        assert_eq!(stats.longest_session_seconds, 500);
    }

    #[test]
    fn average_divides_by_break_count() {
        let mut stats = Statistics::empty_on(day(2));
        for elapsed in 1..=600 {
            stats.record_tick(elapsed, day(2));
        }
        stats.record_break(day(2));
        assert_eq!(stats.average_session_length, 600);
        stats.record_break(day(2));
        stats.record_break(day(2));
        assert_eq!(stats.average_session_length, 200);
    }

    #[test]
    fn rollover_resets_only_daily_fields() {
        let mut stats = Statistics::empty_on(day(2));
        stats.daily_screen_time = 100;
        stats.weekly_screen_time = 1000;
        stats.total_breaks_today = 4;
        stats.longest_session_seconds = 77;

        assert!(stats.roll_over(day(3)));
        assert_eq!(stats.daily_screen_time, 0);
        assert_eq!(stats.total_breaks_today, 0);
        assert_eq!(stats.weekly_screen_time, 1000);
        assert_eq!(stats.longest_session_seconds, 77);
        assert_eq!(stats.last_update_date, day(3));
        assert!(!stats.roll_over(day(3)));
    }

    #[test]
    fn recording_on_a_new_day_resets_yesterday_first() {
        let mut stats = Statistics::empty_on(day(2));
        for elapsed in 1..=50 {
            stats.record_tick(elapsed, day(2));
        }
        stats.record_break(day(2));

        stats.record_break(day(3));
        assert_eq!(stats.daily_screen_time, 0);
        assert_eq!(stats.total_breaks_today, 1);
        assert_eq!(stats.weekly_screen_time, 50);
        assert_eq!(stats.last_update_date, day(3));

        stats.record_tick(1, day(4));
        assert_eq!(stats.daily_screen_time, 1);
        assert_eq!(stats.total_breaks_today, 0);
        assert_eq!(stats.last_update_date, day(4));
    }

    #[test]
    fn load_applies_rollover() {
        let kv = Arc::new(MemoryStore::new());
        let store = StatisticsStore::new(kv.clone());
        let mut stats = Statistics::empty_on(day(2));
        stats.daily_screen_time = 3600;
        stats.weekly_screen_time = 7200;
        stats.total_breaks_today = 2;
        stats.longest_session_seconds = 1800;
        store.save(&stats).unwrap();

        let same_day = store.load_on(day(2));
        assert_eq!(same_day, stats);

        let next_day = store.load_on(day(3));
        assert_eq!(next_day.daily_screen_time, 0);
        assert_eq!(next_day.total_breaks_today, 0);
        assert_eq!(next_day.weekly_screen_time, 7200);
        assert_eq!(next_day.longest_session_seconds, 1800);
        assert_eq!(next_day.last_update_date, day(3));
    }

    #[test]
    fn load_tolerates_garbage() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(STATISTICS_KEY, "not json at all").unwrap();
        let store = StatisticsStore::new(kv);
        assert_eq!(store.load_on(day(5)), Statistics::empty_on(day(5)));
    }

    #[test]
    fn stored_json_uses_camel_case_and_iso_date() {
        let stats = Statistics::empty_on(day(9));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["lastUpdateDate"], "2026-03-09");
        assert_eq!(json["totalBreaksToday"], 0);
    }
}
