use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::mutation_log::MutationLog;

/// The reason a run terminated. Priority among these, when more than one
/// condition could fire at the same step, is the order listed here,
/// highest first: `FatalError` > `MaxRuntimeExceeded` > `MaxStepsReached`
/// > `CustomCriteria` > `FinalAnswer`. `Cancelled` preempts all of them —
/// it is only ever set by an external cancellation signal between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    FinalAnswer,
    MaxStepsReached,
    MaxRuntimeExceeded,
    CustomCriteria,
    FatalError,
    Cancelled,
}

impl StopReason {
    /// Relative priority when multiple conditions hold simultaneously;
    /// lower numbers win.
    fn priority(self) -> u8 {
        match self {
            StopReason::Cancelled => 0,
            StopReason::FatalError => 1,
            StopReason::MaxRuntimeExceeded => 2,
            StopReason::MaxStepsReached => 3,
            StopReason::CustomCriteria => 4,
            StopReason::FinalAnswer => 5,
        }
    }
}

/// Given every termination condition currently holding, return the one
/// that wins under the engine's tie-break policy.
pub fn winning_stop_reason(candidates: &[StopReason]) -> Option<StopReason> {
    candidates.iter().copied().min_by_key(|r| r.priority())
}

/// Mutable per-run container the FSM engine owns for the duration of one
/// run. Agents extend it conceptually via `metadata`; the engine never
/// exposes a back-reference from `State` to itself or to the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub task: String,
    current_step: u32,
    pub max_steps: u32,
    final_result: Option<String>,
    stop_reason: Option<StopReason>,
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    mutation_log: MutationLog,
}

impl State {
    pub fn new(task: impl Into<String>, max_steps: u32) -> Self {
        Self {
            task: task.into(),
            current_step: 0,
            max_steps,
            final_result: None,
            stop_reason: None,
            metadata: HashMap::new(),
            mutation_log: MutationLog::new(),
        }
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn mutation_log(&self) -> &MutationLog {
        &self.mutation_log
    }

    /// Advance `current_step` by exactly one. Called once per completed
    /// step by the engine; never called by agent code.
    pub fn advance_step(&mut self) {
        let old = self.current_step;
        self.current_step += 1;
        self.mutation_log.record(old, "current_step", serde_json::json!(old), serde_json::json!(self.current_step));
    }

    pub fn set_final_result(&mut self, value: impl Into<String>) {
        let value = value.into();
        let old = self.final_result.clone();
        self.final_result = Some(value.clone());
        self.mutation_log.record(
            self.current_step,
            "final_result",
            serde_json::to_value(old).unwrap_or(serde_json::Value::Null),
            serde_json::json!(value),
        );
    }

    /// Set the terminal stop reason. Returns `false` without modifying
    /// state if a stop reason was already recorded — per the data-model
    /// invariant that `stop_reason` is written at most once per run.
    pub fn set_stop_reason(&mut self, reason: StopReason) -> bool {
        if self.stop_reason.is_some() {
            return false;
        }
        self.stop_reason = Some(reason);
        self.mutation_log.record(
            self.current_step,
            "stop_reason",
            serde_json::Value::Null,
            serde_json::to_value(reason).unwrap_or(serde_json::Value::Null),
        );
        true
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        let old = self.metadata.get(&key).cloned().unwrap_or(serde_json::Value::Null);
        self.metadata.insert(key.clone(), value.clone());
        self.mutation_log.record(self.current_step, &format!("metadata.{key}"), old, value);
    }

    pub fn is_terminated(&self) -> bool {
        self.stop_reason.is_some()
    }
}
