use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use agentrt_domain::{
    validate_task, winning_stop_reason, ActionResult, Decision, Message, State, StopReason, Task, ToolCall, TrajectoryEntry, TrajectoryRole,
};
use agentrt_llm::LlmClient;
use agentrt_memory::{MemoryRecord, MemoryStore, RetrievalQuery};
use agentrt_parser::ParserStyle;
use agentrt_tools::{setup_all, teardown_all, Registry, Toolset, ToolsetContext};
use agentrt_trace::{content_hash, EventType, Manifest, RunStatus, RunSummary, StepRecord, TraceEvent, TraceWriter};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::agent::Agent;
use crate::config::{EngineConfig, StoppingCriteria};
use crate::error::{EngineError, Result};
use crate::run_result::RunResult;

/// Drives one [`Agent`] through SPEC_FULL §4.1's one-step algorithm
/// until a terminal [`StopReason`] is reached, emitting a trace as it
/// goes. The LLM client and tool registry are required constructor
/// arguments rather than optional fields, so an "unconfigured engine"
/// cannot be constructed in the first place.
pub struct Engine<A: Agent> {
    agent: A,
    llm: Arc<dyn LlmClient>,
    registry: Arc<Registry>,
    memory: Box<dyn MemoryStore>,
    toolsets: Vec<Toolset>,
    config: EngineConfig,
    stopping_criteria: Option<StoppingCriteria>,
    trace_root: PathBuf,
    cancel: CancellationToken,
}

impl<A: Agent> Engine<A> {
    pub fn new(
        agent: A,
        llm: Arc<dyn LlmClient>,
        registry: Arc<Registry>,
        memory: Box<dyn MemoryStore>,
        config: EngineConfig,
        trace_root: impl AsRef<Path>,
    ) -> Self {
        Self {
            agent,
            llm,
            registry,
            memory,
            toolsets: Vec::new(),
            config,
            stopping_criteria: None,
            trace_root: trace_root.as_ref().to_path_buf(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_toolsets(mut self, toolsets: Vec<Toolset>) -> Self {
        self.toolsets = toolsets;
        self
    }

    pub fn with_stopping_criteria(mut self, criteria: StoppingCriteria) -> Self {
        self.stopping_criteria = Some(criteria);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Execute `task` to termination and return its [`RunResult`].
    ///
    /// Never returns an `Err` for failures that originate inside a run
    /// — LLM transport errors, parse failures, tool faults, and
    /// toolset/trace infrastructure failures are all folded into the
    /// outcome as a `fatal_error` (or ordinary `error`) stop reason
    /// instead. `Err` is reserved for the one precondition §4.1 calls a
    /// programmer error: a structurally invalid task.
    #[tracing::instrument(skip(self, task), fields(task_id = %task.id, run_id = tracing::field::Empty))]
    pub async fn run(&mut self, task: Task) -> Result<RunResult> {
        let issues = validate_task(&task, None);
        if !issues.is_empty() {
            tracing::warn!(issues = issues.len(), "rejecting task: failed validation");
            return Err(EngineError::InvalidTask(issues));
        }

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", tracing::field::display(&run_id));
        tracing::info!("run starting");
        let started_at = Utc::now();
        let clock = Instant::now();

        let max_steps = task.budget.as_ref().and_then(|b| b.max_steps).unwrap_or(self.config.max_steps);
        let max_runtime = task
            .budget
            .as_ref()
            .and_then(|b| b.max_runtime_seconds)
            .map(Duration::from_secs)
            .or(self.config.max_runtime);

        let mut state = State::new(task.objective.clone(), max_steps);
        let ctx = ToolsetContext { run_id: run_id.clone() };

        if let Err(err) = setup_all(&self.toolsets, &ctx) {
            tracing::error!(error = %err, "toolset setup failed; aborting run as fatal_error before any trace could be opened");
            state.set_stop_reason(StopReason::FatalError);
            return Ok(RunResult { step_count: state.current_step(), final_result: None, stop_reason: StopReason::FatalError, records: Vec::new(), trajectory: Vec::new(), state });
        }

        let mut writer = match TraceWriter::open(self.trace_root.join(&run_id)) {
            Ok(writer) => writer,
            Err(err) => {
                tracing::error!(error = %err, "failed to open trace writer; aborting run as fatal_error");
                teardown_all(&self.toolsets, &ctx);
                state.set_stop_reason(StopReason::FatalError);
                return Ok(RunResult { step_count: state.current_step(), final_result: None, stop_reason: StopReason::FatalError, records: Vec::new(), trajectory: Vec::new(), state });
            }
        };

        let mut records: Vec<StepRecord> = Vec::new();
        let mut trajectory: Vec<TrajectoryEntry> = Vec::new();
        let mut last_response: Option<String> = None;
        let mut prompt_hash_source: Option<String> = None;
        let mut tool_call_count: u64 = 0;
        let mut parse_failure_count: u64 = 0;

        macro_rules! write_event_or_abort {
            ($event:expr, $label:lifetime) => {
                if let Err(err) = writer.append_event(&$event) {
                    tracing::error!(error = %err, "failed to write trace event; aborting run as fatal_error");
                    state.set_stop_reason(StopReason::FatalError);
                    break $label;
                }
            };
        }
        macro_rules! write_step_or_abort {
            ($record:expr, $label:lifetime) => {
                if let Err(err) = writer.append_step(&$record) {
                    tracing::error!(error = %err, "failed to write trace step; aborting run as fatal_error");
                    state.set_stop_reason(StopReason::FatalError);
                    break $label;
                }
            };
        }

        let mut opened_ok = true;
        if let Err(err) = writer.append_event(&TraceEvent::new(EventType::RunStart, 0, Utc::now(), Default::default())) {
            tracing::error!(error = %err, "failed to write run_start trace event; aborting run as fatal_error");
            state.set_stop_reason(StopReason::FatalError);
            opened_ok = false;
        }

        'run: while opened_ok {
            let mut candidates = Vec::new();
            if state.current_step() >= max_steps {
                candidates.push(StopReason::MaxStepsReached);
            }
            if let Some(limit) = max_runtime {
                if clock.elapsed() >= limit {
                    candidates.push(StopReason::MaxRuntimeExceeded);
                }
            }
            if self.cancel.is_cancelled() {
                candidates.push(StopReason::Cancelled);
            }
            if let Some(reason) = winning_stop_reason(&candidates) {
                state.set_stop_reason(reason);
                break;
            }

            let step_id = state.current_step();
            tracing::debug!(step_id, "step starting");
            write_event_or_abort!(TraceEvent::new(EventType::StepStart, step_id as u64, Utc::now(), Default::default()), 'run);

            let observation = self.agent.observe(&state);
            trajectory.push(TrajectoryEntry::new(step_id, TrajectoryRole::Observation, observation.clone()));
            let system_prompt = self.agent.system_prompt(&state).map(|p| p.replace("{{tool_schema}}", &self.registry.tool_schema()));
            if prompt_hash_source.is_none() {
                prompt_hash_source = system_prompt.clone();
            }

            let history_query = RetrievalQuery { roles: Some(vec!["user".into(), "assistant".into()]), ..RetrievalQuery::messages() };
            let history = self.memory.retrieve(&history_query).into_messages();
            let current_prompt = self.agent.prepare(&state, &observation);
            trajectory.push(TrajectoryEntry::new(step_id, TrajectoryRole::User, serde_json::Value::String(current_prompt.clone())));

            if let Some(criteria) = &self.stopping_criteria {
                if criteria(&state, last_response.as_deref()) {
                    state.set_stop_reason(StopReason::CustomCriteria);
                    write_event_or_abort!(TraceEvent::new(EventType::StepEnd, step_id as u64, Utc::now(), Default::default()), 'run);
                    break;
                }
            }

            let mut messages = Vec::new();
            if let Some(sp) = &system_prompt {
                messages.push(Message::system(sp.clone()));
            }
            for m in &history {
                messages.push(if m.role == "assistant" { Message::assistant(m.content.clone()) } else { Message::user(m.content.clone()) });
            }
            messages.push(Message::user(current_prompt.clone()));

            write_event_or_abort!(TraceEvent::new(EventType::LlmRequest, step_id as u64, Utc::now(), count_payload("message_count", messages.len())), 'run);
            let raw_text = match self.llm.complete(&messages).await {
                Ok(text) => text,
                Err(err) => format!("LLM error: {err}"),
            };
            write_event_or_abort!(TraceEvent::new(EventType::LlmResponse, step_id as u64, Utc::now(), count_payload("length", raw_text.len())), 'run);
            trajectory.push(TrajectoryEntry::new(step_id, TrajectoryRole::Assistant, serde_json::Value::String(raw_text.clone())));

            let tool_names = self.registry.names();
            let decision = match self.config.parser_style {
                ParserStyle::ReAct => agentrt_parser::parse_react(&raw_text, &tool_names),
                ParserStyle::Default => agentrt_parser::parse(&raw_text, &tool_names),
            };
            if matches!(decision, Decision::Error { .. }) {
                parse_failure_count += 1;
                tracing::warn!(step_id, "decision parse failed");
            }
            trajectory.push(TrajectoryEntry::new(
                step_id,
                TrajectoryRole::Decision,
                serde_json::to_value(&decision).unwrap_or(serde_json::Value::Null),
            ));

            let mut action_results: Vec<ActionResult> = Vec::new();
            match &decision {
                Decision::Final { final_answer } => {
                    state.set_final_result(final_answer.clone());
                    state.set_stop_reason(StopReason::FinalAnswer);
                }
                Decision::Act { actions, .. } => {
                    for call in actions {
                        let result = if let Some(err) = &call.error {
                            ActionResult::error(err.clone(), "parse_error", &call.args)
                        } else {
                            self.registry.dispatch(&call.name, call.args.clone()).await
                        };
                        write_event_or_abort!(TraceEvent::new(EventType::ToolCall, step_id as u64, Utc::now(), tool_call_payload(call, &result)), 'run);
                        tracing::debug!(step_id, tool = %call.name, status = ?result.status, "tool call dispatched");
                        trajectory.push(TrajectoryEntry::new(
                            step_id,
                            TrajectoryRole::Action,
                            serde_json::json!({"name": call.name, "args": call.args}),
                        ));
                        trajectory.push(TrajectoryEntry::new(
                            step_id,
                            TrajectoryRole::ActionResult,
                            serde_json::to_value(&result).unwrap_or(serde_json::Value::Null),
                        ));
                        tool_call_count += 1;
                        action_results.push(result);
                    }
                }
                Decision::Wait { .. } => {}
                Decision::Error { error_message } => {
                    action_results.push(ActionResult::error(error_message.clone(), "decision_error", &Default::default()));
                }
            }

            self.agent.reduce(&mut state, &observation, &decision, &action_results);

            self.memory.append(MemoryRecord::new("user", current_prompt.clone(), step_id as u64));
            let mut assistant_record = MemoryRecord::new("assistant", raw_text.clone(), step_id as u64);
            if action_results.iter().any(|r| r.is_error()) {
                assistant_record = assistant_record.with_status("error");
            }
            self.memory.append(assistant_record);
            self.memory.evict();

            let record = StepRecord {
                step_id: step_id as u64,
                rationale: decision_rationale(&decision),
                decision_mode: decision.mode().to_string(),
                actions: decision_actions(&decision),
                action_results: action_results.clone(),
                state_diff: state_diff_for_step(&state, step_id),
                stop_reason: state.stop_reason().map(stop_reason_str),
            };
            write_step_or_abort!(record, 'run);
            records.push(record);

            last_response = Some(raw_text);
            state.advance_step();
            write_event_or_abort!(TraceEvent::new(EventType::StepEnd, step_id as u64, Utc::now(), Default::default()), 'run);

            if state.is_terminated() {
                break;
            }
        }

        teardown_all(&self.toolsets, &ctx);

        let ended_at = Utc::now();
        let stop_reason = state.stop_reason().unwrap_or(StopReason::FatalError);
        // Best-effort from here on: the run itself is over, so a trace-write
        // failure at this point can no longer abort anything further — it is
        // logged and otherwise ignored rather than escaping as an `Err`.
        if let Err(err) = writer.append_event(&TraceEvent::new(EventType::RunEnd, state.current_step() as u64, ended_at, Default::default())) {
            tracing::error!(error = %err, "failed to write run_end trace event (best effort, ignoring)");
        }

        let manifest = Manifest {
            run_id: run_id.clone(),
            started_at,
            ended_at,
            status: if matches!(stop_reason, StopReason::FatalError | StopReason::Cancelled) { RunStatus::Aborted } else { RunStatus::Completed },
            model_id: self.config.model_id.clone(),
            prompt_hash: content_hash(prompt_hash_source.as_deref().unwrap_or("")),
            tool_versions: Default::default(),
            seed: self.config.seed,
            run_config_hash: content_hash(&format!("{}:{}:{:?}:{:?}", self.config.model_id, self.config.max_steps, self.config.max_runtime, self.config.parser_style)),
            summary: RunSummary {
                stop_reason: stop_reason_str(stop_reason),
                final_result: state.final_result().map(str::to_string),
                steps: records.len() as u64,
                tool_calls: tool_call_count,
                parse_failures: parse_failure_count,
                duration_ms: clock.elapsed().as_millis() as u64,
            },
        };
        if let Err(err) = writer.finalize(&manifest) {
            tracing::error!(error = %err, "failed to finalize trace manifest (best effort, ignoring)");
        }

        tracing::info!(
            stop_reason = stop_reason_str(stop_reason),
            steps = records.len(),
            tool_calls = tool_call_count,
            duration_ms = clock.elapsed().as_millis() as u64,
            "run finished"
        );

        Ok(RunResult { step_count: state.current_step(), final_result: state.final_result().map(str::to_string), stop_reason, records, trajectory, state })
    }
}

fn stop_reason_str(reason: StopReason) -> String {
    serde_json::to_value(reason).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| "unknown".to_string())
}

fn decision_rationale(decision: &Decision) -> Option<String> {
    match decision {
        Decision::Act { rationale, .. } => rationale.clone(),
        Decision::Wait { rationale } => rationale.clone(),
        _ => None,
    }
}

fn decision_actions(decision: &Decision) -> Vec<ToolCall> {
    match decision {
        Decision::Act { actions, .. } => actions.clone(),
        _ => Vec::new(),
    }
}

/// Mutations the engine's own accessor methods recorded during this
/// step's `set_final_result`/`set_stop_reason`/`set_metadata` calls,
/// keyed by field name (last write per field wins, matching how a
/// single `{old, new}` diff reads for a field written more than once).
fn state_diff_for_step(state: &State, step_id: u32) -> serde_json::Map<String, serde_json::Value> {
    let mut diff = serde_json::Map::new();
    for entry in state.mutation_log().entries().iter().filter(|e| e.step_id == step_id) {
        diff.insert(entry.field.clone(), serde_json::json!({"old": entry.old_value, "new": entry.new_value}));
    }
    diff
}

fn count_payload(key: &str, value: usize) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), serde_json::json!(value));
    map
}

fn tool_call_payload(call: &ToolCall, result: &ActionResult) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert("name".into(), serde_json::json!(call.name));
    map.insert("args".into(), serde_json::Value::Object(call.args.clone()));
    map.insert("status".into(), serde_json::to_value(result.status).unwrap_or(serde_json::Value::Null));
    map
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use agentrt_domain::ActionResult as Res;
    use agentrt_llm::ScriptedLlmClient;
    use agentrt_memory::WindowMemory;
    use agentrt_tools::{Tool, ToolDefinition};
    use async_trait::async_trait;

    use super::*;

    /// Echoes its `n` argument back, doubled. Exercises `act` dispatch.
    struct Doubler;

    #[async_trait]
    impl Tool for Doubler {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("double", "doubles a number").requiring(["n"]))
        }

        async fn run(&self, args: serde_json::Map<String, serde_json::Value>) -> Res {
            let n = args.get("n").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let mut payload = serde_json::Map::new();
            payload.insert("result".into(), serde_json::json!(n * 2.0));
            Res::success(payload)
        }
    }

    /// An agent that observes the step count and reduce-counts calls, but
    /// otherwise puts no real reasoning behind its prompts — the LLM
    /// responses are scripted, so the agent only needs to plumb state
    /// through faithfully.
    struct CountingAgent {
        reduce_calls: AtomicU32,
    }

    impl CountingAgent {
        fn new() -> Self {
            Self { reduce_calls: AtomicU32::new(0) }
        }
    }

    impl Agent for CountingAgent {
        fn system_prompt(&self, _state: &State) -> Option<String> {
            Some("Tools available:\n{{tool_schema}}".to_string())
        }

        fn observe(&mut self, state: &State) -> serde_json::Value {
            serde_json::json!({"step": state.current_step()})
        }

        fn prepare(&mut self, state: &State, _observation: &serde_json::Value) -> String {
            format!("step {}: what next?", state.current_step())
        }

        fn reduce(&mut self, _state: &mut State, _observation: &serde_json::Value, _decision: &Decision, _action_results: &[ActionResult]) {
            self.reduce_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn registry_with_doubler() -> Arc<Registry> {
        let mut registry = Registry::new();
        registry.register(Arc::new(Doubler), false).unwrap();
        Arc::new(registry)
    }

    fn engine_with(
        responses: impl IntoIterator<Item = impl Into<String>>,
        trace_root: &std::path::Path,
    ) -> (Engine<CountingAgent>, Arc<ScriptedLlmClient>) {
        let llm = Arc::new(ScriptedLlmClient::new("scripted", responses));
        let engine = Engine::new(
            CountingAgent::new(),
            llm.clone(),
            registry_with_doubler(),
            Box::new(WindowMemory::new(20)),
            EngineConfig::new("scripted-model", 10),
            trace_root,
        );
        (engine, llm)
    }

    #[tokio::test]
    async fn final_answer_terminates_with_matching_stop_reason() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(["Final Answer: 42"], dir.path());
        let result = engine.run(Task::new("t1", "answer the question")).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::FinalAnswer);
        assert_eq!(result.final_result.as_deref(), Some("42"));
        assert_eq!(result.records.len(), 1);
        assert_eq!(engine.agent().reduce_calls.load(Ordering::SeqCst), 1);
        assert!(result.trajectory.iter().any(|e| e.role == TrajectoryRole::Decision));
        assert!(result.trajectory.iter().any(|e| e.role == TrajectoryRole::Assistant && e.content == "Final Answer: 42"));
    }

    #[tokio::test]
    async fn act_decision_dispatches_through_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(["Action: double(n=21)", "Final Answer: done"], dir.path());
        let result = engine.run(Task::new("t1", "double a number")).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::FinalAnswer);
        assert_eq!(result.records[0].decision_mode, "act");
        assert_eq!(result.records[0].action_results[0].payload["result"], 42.0);
        assert!(result.trajectory.iter().any(|e| e.role == TrajectoryRole::Action && e.content["name"] == "double"));
        assert!(result.trajectory.iter().any(|e| e.role == TrajectoryRole::ActionResult));
    }

    #[tokio::test]
    async fn max_steps_reached_when_model_never_concludes() {
        let dir = tempfile::tempdir().unwrap();
        let responses = vec!["Action: double(n=1)".to_string(); 3];
        let (mut engine, _llm) = engine_with(responses, dir.path());
        let mut task = Task::new("t1", "never finish");
        task.budget = Some(agentrt_domain::TaskBudget { max_steps: Some(3), max_runtime_seconds: None, max_tokens: None });
        let result = engine.run(task).await.unwrap();
        assert_eq!(result.stop_reason, StopReason::MaxStepsReached);
        assert_eq!(result.step_count, 3);
    }

    #[tokio::test]
    async fn invalid_task_is_rejected_before_any_step_runs() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(Vec::<String>::new(), dir.path());
        let result = engine.run(Task::new("", "")).await;
        assert!(matches!(result, Err(EngineError::InvalidTask(_))));
    }

    #[tokio::test]
    async fn unknown_tool_produces_an_error_envelope_without_reclassifying_the_decision() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(["Action: triple(n=1)", "Final Answer: done"], dir.path());
        let result = engine.run(Task::new("t1", "call a missing tool")).await.unwrap();
        assert_eq!(result.records[0].decision_mode, "act");
        assert!(result.records[0].action_results[0].is_error());
    }

    #[tokio::test]
    async fn trace_directory_validates_after_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(["Final Answer: ok"], dir.path());
        engine.run(Task::new("t1", "finish immediately")).await.unwrap();
        let run_dirs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(run_dirs.len(), 1);
        agentrt_trace::validate_trace_dir(&run_dirs[0]).unwrap();
    }

    #[tokio::test]
    async fn step_count_increases_monotonically_across_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let (mut engine, _llm) = engine_with(["Action: double(n=1)", "Action: double(n=2)", "Final Answer: ok"], dir.path());
        let result = engine.run(Task::new("t1", "do two steps then finish")).await.unwrap();
        let steps: Vec<u64> = result.records.iter().map(|r| r.step_id).collect();
        assert_eq!(steps, vec![0, 1, 2]);
    }
}
