use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of `events.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub step_id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl TraceEvent {
    pub fn new(event_type: EventType, step_id: u64, timestamp: DateTime<Utc>, payload: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { event_type, step_id, timestamp, payload }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RunStart,
    StepStart,
    LlmRequest,
    LlmResponse,
    ToolCall,
    StepEnd,
    RunEnd,
}

/// One line of `steps.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: u64,
    #[serde(default)]
    pub rationale: Option<String>,
    pub decision_mode: String,
    pub actions: Vec<agentrt_domain::ToolCall>,
    pub action_results: Vec<agentrt_domain::ActionResult>,
    #[serde(default)]
    pub state_diff: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}
