//! Burnout advisory client.
//!
//! Posts a session snapshot to an external prediction service and reads back
//! a risk tier. Advisory only: nothing in the tracker waits on it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::AdvisoryError;
use crate::storage::Statistics;
use crate::tracker::TrackingSession;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001/predict";

const BURNOUT_TIPS: [&str; 8] = [
    "Take regular short breaks from screens.",
    "Get at least 7-8 hours of sleep each night.",
    "Practice mindfulness or meditation.",
    "Stay hydrated and eat balanced meals.",
    "Talk to someone you trust about how you're feeling.",
    "Limit multitasking and focus on one thing at a time.",
    "Schedule time for hobbies and relaxation.",
    "Exercise regularly, even a short walk helps.",
];

/// Tips shown alongside a high risk result.
pub fn burnout_tips() -> &'static [&'static str] {
    &BURNOUT_TIPS[..4]
}

/// Request body. Times are minutes, sleep is hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnoutRequest {
    pub screen_time: f64,
    pub breaks: u32,
    pub last_break: f64,
    pub mood: u8,
    pub sleep: f64,
}

impl BurnoutRequest {
    /// Snapshot of the live session. `breaks` counts every break taken today.
    pub fn from_tracking(
        session: &TrackingSession,
        stats: &Statistics,
        mood: u8,
        sleep: f64,
    ) -> Self {
        Self {
            screen_time: session.elapsed_secs as f64 / 60.0,
            breaks: stats.total_breaks_today,
            last_break: session.time_since_last_break_secs as f64 / 60.0,
            mood,
            sleep,
        }
    }

    pub fn validate(&self) -> Result<(), AdvisoryError> {
        if !(1..=5).contains(&self.mood) {
            return Err(AdvisoryError::InvalidInput {
                field: "mood".into(),
                message: format!("{} is outside 1-5", self.mood),
            });
        }
        if !(0.0..=24.0).contains(&self.sleep) {
            return Err(AdvisoryError::InvalidInput {
                field: "sleep".into(),
                message: format!("{} is outside 0-24 hours", self.sleep),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
    Unknown,
}

impl BurnoutRisk {
    /// Accepts `"low"`/`"medium"`/`"high"` or the codes 0/1/2.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "low" => BurnoutRisk::Low,
                "medium" => BurnoutRisk::Medium,
                "high" => BurnoutRisk::High,
                _ => BurnoutRisk::Unknown,
            },
            Value::Number(n) => match n.as_u64() {
                Some(code) => Self::from_code(code),
                None => BurnoutRisk::Unknown,
            },
            _ => BurnoutRisk::Unknown,
        }
    }

    pub fn from_code(code: u64) -> Self {
        match code {
            0 => BurnoutRisk::Low,
            1 => BurnoutRisk::Medium,
            2 => BurnoutRisk::High,
            _ => BurnoutRisk::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BurnoutRisk::Low => "Low",
            BurnoutRisk::Medium => "Medium",
            BurnoutRisk::High => "High",
            BurnoutRisk::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurnoutPrediction {
    pub risk: BurnoutRisk,
    pub recommendations: Vec<String>,
}

/// HTTP client for the prediction endpoint.
#[derive(Debug, Clone)]
pub struct BurnoutClient {
    http: Client,
    endpoint: Url,
}

impl BurnoutClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AdvisoryError> {
        let endpoint = Url::parse(endpoint).map_err(|e| AdvisoryError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One round trip to the prediction service.
    pub async fn predict(&self, request: &BurnoutRequest) -> Result<BurnoutPrediction, AdvisoryError> {
        request.validate()?;
        debug!(endpoint = %self.endpoint, ?request, "requesting burnout prediction");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "prediction service returned an error");
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;
        if !body.is_object() {
            return Err(AdvisoryError::MalformedResponse(
                "expected a JSON object".into(),
            ));
        }

        let risk = body
            .get("risk_level")
            .map(BurnoutRisk::from_json)
            .unwrap_or(BurnoutRisk::Unknown);
        let recommendations = body
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(BurnoutPrediction {
            risk,
            recommendations,
        })
    }
}

/// Rule-based score used by the prediction service, for offline use.
pub fn estimate_locally(request: &BurnoutRequest) -> BurnoutRisk {
    let mut score = 0u64;

    if request.screen_time > 240.0 {
        score += 2;
    } else if request.screen_time > 120.0 {
        score += 1;
    }

    if request.breaks == 0 {
        score += 2;
    } else if request.breaks < 2 {
        score += 1;
    }

    if request.last_break > 120.0 {
        score += 2;
    } else if request.last_break > 60.0 {
        score += 1;
    }

    if request.mood <= 2 {
        score += 2;
    } else if request.mood <= 3 {
        score += 1;
    }

    if request.sleep < 5.0 {
        score += 2;
    } else if request.sleep < 7.0 {
        score += 1;
    }

    BurnoutRisk::from_code((score / 2).min(2))
}
