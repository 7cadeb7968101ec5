use serde::{Deserialize, Serialize};

/// One stored turn of history. `role` is kept as a plain string rather
/// than [`agentrt_domain::Role`] because strategies synthesize roles
/// that don't exist in a chat transcript (e.g. vector retrieval tags
/// hits as `"user"` with an `Observation:` prefix, independent of the
/// role the content was originally recorded under).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub role: String,
    pub content: String,
    pub step_id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl MemoryRecord {
    pub fn new(role: impl Into<String>, content: impl Into<String>, step_id: u64) -> Self {
        Self { role: role.into(), content: content.into(), step_id, status: None, metadata: serde_json::Map::new() }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Shape of the one `{role, content}` pair retrieval produces in
/// `format="messages"` mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrievedMessage {
    pub role: String,
    pub content: String,
}

/// Which shape [`crate::store::MemoryStore::retrieve`] should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalFormat {
    #[default]
    Records,
    Messages,
}

/// The recognized retrieval options shared by every strategy. Every
/// field is optional; a default query returns every record in
/// step-ascending order as records.
#[derive(Debug, Clone, Default)]
pub struct RetrievalQuery {
    pub roles: Option<Vec<String>>,
    pub step_min: Option<u64>,
    pub step_max: Option<u64>,
    pub max_items: Option<usize>,
    pub text: Option<String>,
    pub top_k: Option<usize>,
    pub format: RetrievalFormat,
}

impl RetrievalQuery {
    pub fn messages() -> Self {
        Self { format: RetrievalFormat::Messages, ..Default::default() }
    }

    pub fn matches_role(&self, role: &str) -> bool {
        match &self.roles {
            Some(roles) => roles.iter().any(|r| r == role),
            None => true,
        }
    }

    pub fn matches_step(&self, step_id: u64) -> bool {
        self.step_min.map_or(true, |min| step_id >= min) && self.step_max.map_or(true, |max| step_id <= max)
    }
}

/// The return value of a retrieval call: either the raw records or
/// chat-shaped messages, depending on the query's format.
#[derive(Debug, Clone)]
pub enum Retrieval {
    Records(Vec<MemoryRecord>),
    Messages(Vec<RetrievedMessage>),
}

impl Retrieval {
    pub fn into_records(self) -> Vec<MemoryRecord> {
        match self {
            Retrieval::Records(r) => r,
            Retrieval::Messages(_) => Vec::new(),
        }
    }

    pub fn into_messages(self) -> Vec<RetrievedMessage> {
        match self {
            Retrieval::Messages(m) => m,
            Retrieval::Records(r) => r.into_iter().map(|rec| RetrievedMessage { role: rec.role, content: rec.content }).collect(),
        }
    }
}
