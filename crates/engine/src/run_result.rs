use agentrt_domain::{State, StopReason, TrajectoryEntry};
use agentrt_trace::StepRecord;

/// What [`crate::engine::Engine::run`] hands back once a task has
/// reached a terminal `stop_reason`.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub state: State,
    pub records: Vec<StepRecord>,
    /// Finer-grained than `records`: one entry per user/assistant/
    /// decision/action/observation/action_result component of a step,
    /// rather than one aggregate per step. Independent of the durable
    /// trace written under `trace_root` — this is the in-memory form a
    /// caller or downstream memory store can replay without reopening
    /// the trace files.
    pub trajectory: Vec<TrajectoryEntry>,
    pub stop_reason: StopReason,
    pub step_count: u32,
    pub final_result: Option<String>,
}
