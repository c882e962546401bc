use serde::{Deserialize, Serialize};

pub const RESTING_HEART_RATE_BPM: u32 = 72;

/// One day's accumulated health metrics.
///
/// The persisted form is a flat camelCase object; any missing or extra key
/// makes the stored value unreadable so a stale schema falls back to the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricsRecord {
    pub steps: u64,
    pub water_intake_ml: u64,
    pub calories_burned: u64,
    pub heart_rate_bpm: u32,
    pub distance_km: f64,
    pub sleep_hours: f64,
}

impl MetricsRecord {
    pub fn baseline() -> Self {
        Self {
            steps: 0,
            water_intake_ml: 0,
            calories_burned: 0,
            heart_rate_bpm: RESTING_HEART_RATE_BPM,
            distance_km: 0.0,
            sleep_hours: 0.0,
        }
    }
}

impl Default for MetricsRecord {
    fn default() -> Self {
        Self::baseline()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WaterRequest {
    pub amount_ml: u64,
}

#[derive(Debug, Deserialize)]
pub struct StepsRequest {
    pub steps: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SleepRequest {
    pub delta_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub metrics: MetricsRecord,
    pub water_goal_ml: u64,
    pub water_progress_percent: f64,
    pub step_goal: u64,
    pub strategy_hint: String,
}
