use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the batch output file. Field names match the output
/// contract exactly since external tooling (metric dashboards, resume
/// logic in other languages) keys off them by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRow {
    pub task_id: String,
    pub idx: usize,
    pub trial: u64,
    pub benchmark: String,
    pub split: String,
    pub reward: f64,
    pub success: bool,
    pub eval_score: f64,
    #[serde(default)]
    pub eval_details: serde_json::Value,
    pub stop_reason: String,
    pub steps: u64,
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub latency_seconds: f64,
}
