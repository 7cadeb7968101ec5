use serde::{Deserialize, Serialize};

/// Outcome status of one dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Partial,
    Error,
}

/// Uniform envelope wrapping every tool invocation's outcome, whether it
/// succeeded, partially succeeded, or failed for any of the reasons
/// catalogued in the error taxonomy (not found, validation, execution,
/// timeout). The dispatcher is the only place that constructs these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    pub payload: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ActionResult {
    pub fn success(payload: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { status: ActionStatus::Success, payload, duration_ms: None }
    }

    pub fn error(message: impl Into<String>, error_type: &str, args: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert("message".into(), serde_json::json!(message.into()));
        payload.insert("error_type".into(), serde_json::json!(error_type));
        payload.insert("args".into(), serde_json::Value::Object(args.clone()));
        Self { status: ActionStatus::Error, payload, duration_ms: None }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == ActionStatus::Error
    }
}
