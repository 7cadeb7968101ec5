use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub stop_reason: String,
    #[serde(default)]
    pub final_result: Option<String>,
    pub steps: u64,
    pub tool_calls: u64,
    pub parse_failures: u64,
    pub duration_ms: u64,
}

/// Written once, at finalize. Every field here is required by the schema
/// validator — there is no optional-field escape hatch in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub status: RunStatus,
    pub model_id: String,
    pub prompt_hash: String,
    pub tool_versions: serde_json::Map<String, serde_json::Value>,
    pub seed: u64,
    pub run_config_hash: String,
    pub summary: RunSummary,
}

/// SHA-256 of the given text, hex-encoded. Used for both `prompt_hash`
/// (over the system prompt) and `run_config_hash` (over the resolved
/// config's canonical JSON).
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(digest)
}
