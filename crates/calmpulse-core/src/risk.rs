//! Rule-based screen-time risk and recommendations.
//!
//! The tier depends only on session elapsed time against the configured
//! maximum. Break state changes the status label and the recommendation list,
//! never the tier.

use serde::{Deserialize, Serialize};

use crate::storage::{Settings, Statistics};
use crate::tracker::BreakActivity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// `high` at or above the maximum, `medium` at or above 70% of it.
    ///
    /// Compared in whole seconds so that 84 minutes of a 120 minute limit
    /// lands exactly on the medium boundary.
    pub fn for_elapsed(elapsed_secs: u64, max_screen_time_minutes: u32) -> Self {
        let limit_secs = u64::from(max_screen_time_minutes) * 60;
        if elapsed_secs >= limit_secs {
            RiskTier::High
        } else if elapsed_secs * 10 >= limit_secs * 7 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }
}

/// Live break details, present only while on a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakStatus {
    pub activity: BreakActivity,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub tier: RiskTier,
    pub on_break: bool,
    /// `"On Break"` during a break, otherwise the tier label.
    pub status_label: String,
    pub recommendations: Vec<String>,
}

/// Map the current session and settings to a tier and recommendations.
pub fn evaluate(
    elapsed_secs: u64,
    settings: &Settings,
    stats: &Statistics,
    on_break: Option<BreakStatus>,
) -> Assessment {
    let tier = RiskTier::for_elapsed(elapsed_secs, settings.max_screen_time_minutes);

    if let Some(status) = on_break {
        return Assessment {
            tier,
            on_break: true,
            status_label: "On Break".into(),
            recommendations: vec![
                format!("{} of break time remaining", format_time(status.remaining_secs)),
                status.activity.description().to_string(),
                "Stretch and move around".into(),
                if settings.water_reminders {
                    "Remember to stay hydrated".into()
                } else {
                    "Take deep breaths".into()
                },
            ],
        };
    }

    let goal_line = format!(
        "Daily Goal: {}% ({})",
        daily_goal_progress_pct(stats.daily_screen_time, settings.daily_goal_minutes),
        format_time(stats.daily_screen_time)
    );
    let minutes_left = minutes_until_limit(elapsed_secs, settings.max_screen_time_minutes);

    let recommendations = match tier {
        RiskTier::High => vec![
            goal_line,
            format!(
                "You've exceeded your {} minute limit",
                settings.max_screen_time_minutes
            ),
            "Please take a long break now".into(),
            format!(
                "Longest session today: {}",
                format_time(stats.longest_session_seconds)
            ),
        ],
        RiskTier::Medium => vec![
            goal_line,
            format!("{minutes_left} minutes until max screen time"),
            format!("Taken {} breaks today", stats.total_breaks_today),
            format!(
                "Average session: {}",
                format_time(stats.average_session_length)
            ),
        ],
        RiskTier::Low => vec![
            goal_line,
            format!("{minutes_left} minutes until max screen time"),
            format!("Breaks today: {}", stats.total_breaks_today),
        ],
    };

    Assessment {
        tier,
        on_break: false,
        status_label: tier.label().into(),
        recommendations,
    }
}

/// `round(100 × daily / goal)`, not clamped.
pub fn daily_goal_progress_pct(daily_screen_time_secs: u64, daily_goal_minutes: u32) -> u64 {
    let goal_secs = u64::from(daily_goal_minutes) * 60;
    if goal_secs == 0 {
        return 0;
    }
    (100.0 * daily_screen_time_secs as f64 / goal_secs as f64).round() as u64
}

/// Whole minutes left before the limit, rounded up. Negative once past it.
pub fn minutes_until_limit(elapsed_secs: u64, max_screen_time_minutes: u32) -> i64 {
    let left_secs = i64::from(max_screen_time_minutes) * 60 - elapsed_secs as i64;
    left_secs.div_euclid(60) + i64::from(left_secs.rem_euclid(60) != 0)
}

/// `45s`, `2m 5s`, `1h 1m 1s`.
pub fn format_time(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    if minutes < 60 {
        return format!("{minutes}m {remaining_seconds}s");
    }
    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    format!("{hours}h {remaining_minutes}m {remaining_seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stats() -> Statistics {
        Statistics::empty_on(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
    }

    #[test]
    fn format_time_examples() {
        assert_eq!(format_time(0), "0s");
        assert_eq!(format_time(45), "45s");
        assert_eq!(format_time(60), "1m 0s");
        assert_eq!(format_time(125), "2m 5s");
        assert_eq!(format_time(3600), "1h 0m 0s");
        assert_eq!(format_time(3661), "1h 1m 1s");
    }

    #[test]
    fn tier_boundaries_for_120_minutes() {
        assert_eq!(RiskTier::for_elapsed(119 * 60, 120), RiskTier::Medium);
        assert_eq!(RiskTier::for_elapsed(120 * 60, 120), RiskTier::High);
        assert_eq!(RiskTier::for_elapsed(85 * 60, 120), RiskTier::Medium);
        assert_eq!(RiskTier::for_elapsed(84 * 60, 120), RiskTier::Medium);
        assert_eq!(RiskTier::for_elapsed(84 * 60 - 1, 120), RiskTier::Low);
        assert_eq!(RiskTier::for_elapsed(83 * 60, 120), RiskTier::Low);
    }

    #[test]
    fn minutes_until_limit_rounds_up() {
        assert_eq!(minutes_until_limit(0, 120), 120);
        assert_eq!(minutes_until_limit(30, 120), 120);
        assert_eq!(minutes_until_limit(60, 120), 119);
        assert_eq!(minutes_until_limit(85 * 60 + 1, 120), 35);
        assert_eq!(minutes_until_limit(121 * 60, 120), -1);
    }

    #[test]
    fn goal_progress_is_rounded_and_unclamped() {
        assert_eq!(daily_goal_progress_pct(0, 480), 0);
        assert_eq!(daily_goal_progress_pct(144 * 60, 480), 30);
        assert_eq!(daily_goal_progress_pct(100, 60), 3);
        assert_eq!(daily_goal_progress_pct(960 * 60, 480), 200);
    }

    #[test]
    fn low_tier_recommendations() {
        let mut s = stats();
        s.daily_screen_time = 30 * 60;
        s.total_breaks_today = 1;
        let a = evaluate(30 * 60, &Settings::default(), &s, None);
        assert_eq!(a.tier, RiskTier::Low);
        assert_eq!(a.status_label, "Low Risk");
        assert_eq!(
            a.recommendations,
            vec![
                "Daily Goal: 6% (30m 0s)".to_string(),
                "90 minutes until max screen time".to_string(),
                "Breaks today: 1".to_string(),
            ]
        );
    }

    #[test]
    fn medium_tier_recommendations() {
        let mut s = stats();
        s.daily_screen_time = 90 * 60;
        s.total_breaks_today = 2;
        s.average_session_length = 45 * 60;
        let a = evaluate(90 * 60, &Settings::default(), &s, None);
        assert_eq!(a.tier, RiskTier::Medium);
        assert_eq!(a.recommendations.len(), 4);
        assert_eq!(a.recommendations[1], "30 minutes until max screen time");
        assert_eq!(a.recommendations[2], "Taken 2 breaks today");
        assert_eq!(a.recommendations[3], "Average session: 45m 0s");
    }

    #[test]
    fn high_tier_recommendations() {
        let mut s = stats();
        s.daily_screen_time = 130 * 60;
        s.longest_session_seconds = 130 * 60;
        let a = evaluate(130 * 60, &Settings::default(), &s, None);
        assert_eq!(a.tier, RiskTier::High);
        assert_eq!(a.recommendations[0], "Daily Goal: 27% (2h 10m 0s)");
        assert_eq!(a.recommendations[1], "You've exceeded your 120 minute limit");
        assert_eq!(a.recommendations[2], "Please take a long break now");
        assert_eq!(a.recommendations[3], "Longest session today: 2h 10m 0s");
    }

    #[test]
    fn break_overrides_label_but_not_tier() {
        let status = BreakStatus {
            activity: BreakActivity::Walk,
            remaining_secs: 125,
        };
        let a = evaluate(130 * 60, &Settings::default(), &stats(), Some(status));
        assert_eq!(a.tier, RiskTier::High);
        assert!(a.on_break);
        assert_eq!(a.status_label, "On Break");
        assert_eq!(
            a.recommendations,
            vec![
                "2m 5s of break time remaining".to_string(),
                "Take a short walk".to_string(),
                "Stretch and move around".to_string(),
                "Remember to stay hydrated".to_string(),
            ]
        );

        let settings = Settings {
            water_reminders: false,
            ..Settings::default()
        };
        let a = evaluate(0, &settings, &stats(), Some(status));
        assert_eq!(a.recommendations[3], "Take deep breaths");
    }
}
