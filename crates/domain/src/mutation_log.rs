use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded write to a [`crate::state::State`] field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    pub step_id: u32,
    pub field: String,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of every field write a run's [`crate::state::State`]
/// goes through. Entries are written via `State`'s accessor methods, not
/// by attribute interception — there is nothing to intercept in Rust, so
/// the accessors themselves are the single choke point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationLog(Vec<MutationRecord>);

impl MutationLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn record(&mut self, step_id: u32, field: &str, old_value: serde_json::Value, new_value: serde_json::Value) {
        self.0.push(MutationRecord {
            step_id,
            field: field.to_string(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[MutationRecord] {
        &self.0
    }

    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
