use agentrt_domain::Task;

use crate::error::{BatchError, Result};

/// External collaborator contract: turns whatever a benchmark's own
/// storage format looks like into canonical [`Task`]s, opaquely to the
/// runner. A real deployment plugs in one adapter per dataset; this
/// crate ships only the trait and [`InMemoryAdapter`], used by tests and
/// the release smoke check.
pub trait BenchmarkAdapter: Send + Sync {
    /// Every record this benchmark has to offer, as an opaque mapping.
    fn load_records(&self) -> Result<Vec<serde_json::Value>>;

    /// Build the canonical [`Task`] for one record. `split` and `idx`
    /// are handed through so an adapter can fold them into the task's
    /// `id`/`metadata` if its dataset doesn't already carry them.
    fn to_task(&self, record: &serde_json::Value, split: &str, idx: usize) -> Result<Task>;
}

/// Wraps a fixed `Vec<Task>`, round-tripping each one through JSON so
/// `load_records`/`to_task` exercise the same contract a real adapter
/// would, without needing an actual dataset on disk.
pub struct InMemoryAdapter {
    tasks: Vec<Task>,
}

impl InMemoryAdapter {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl BenchmarkAdapter for InMemoryAdapter {
    fn load_records(&self) -> Result<Vec<serde_json::Value>> {
        self.tasks.iter().map(|t| serde_json::to_value(t).map_err(BatchError::from)).collect()
    }

    fn to_task(&self, record: &serde_json::Value, split: &str, idx: usize) -> Result<Task> {
        let mut task: Task = serde_json::from_value(record.clone()).map_err(BatchError::from)?;
        task.metadata.entry("split".to_string()).or_insert_with(|| serde_json::Value::String(split.to_string()));
        task.metadata.entry("record_index".to_string()).or_insert_with(|| serde_json::Value::from(idx));
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_tasks_through_json() {
        let adapter = InMemoryAdapter::new(vec![Task::new("t1", "do the thing")]);
        let records = adapter.load_records().unwrap();
        assert_eq!(records.len(), 1);
        let task = adapter.to_task(&records[0], "test", 0).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.metadata["split"], "test");
    }
}
