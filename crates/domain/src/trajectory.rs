use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role a [`TrajectoryEntry`] plays in the recorded conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryRole {
    User,
    Assistant,
    Action,
    Observation,
    Decision,
    ActionResult,
}

/// One recorded turn in a run's trajectory, independent of the durable
/// JSONL trace files — this is the in-memory record an agent or memory
/// store operates on during the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryEntry {
    pub step_id: u32,
    pub role: TrajectoryRole,
    pub content: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TrajectoryEntry {
    pub fn new(step_id: u32, role: TrajectoryRole, content: serde_json::Value) -> Self {
        Self { step_id, role, content, timestamp: Utc::now(), metadata: serde_json::Map::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        let entry = TrajectoryEntry::new(0, TrajectoryRole::ActionResult, serde_json::json!({}));
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["role"], "action_result");
    }
}
