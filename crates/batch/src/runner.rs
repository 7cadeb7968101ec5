use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agentrt_domain::{StopReason, Task};
use agentrt_engine::{Agent, Engine, EngineConfig};
use agentrt_eval::{compute_report, EvaluationContext, EvaluationSuite, MetricInput, MetricReport};
use agentrt_llm::LlmClient;
use agentrt_memory::MemoryStore;
use agentrt_tools::{Registry, Toolset};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::adapter::BenchmarkAdapter;
use crate::concurrency::ConcurrencyGuard;
use crate::error::Result;
use crate::output::{completed_work_items, read_rows, OutputWriter};
use crate::row::BatchRow;
use crate::work::build_work_list;

/// How to build a fresh, unshared set of per-job collaborators for each
/// task run. Every closure is called once per job: the batch runner's
/// isolation guarantee (§5) is that a run owns its own agent, LLM
/// client, tool registry, memory store, and toolsets, so factories — not
/// shared instances — are what the runner is given.
pub struct JobFactories<A: Agent + 'static> {
    pub agent: Arc<dyn Fn() -> A + Send + Sync>,
    pub llm: Arc<dyn Fn() -> Arc<dyn LlmClient> + Send + Sync>,
    pub registry: Arc<dyn Fn() -> Arc<Registry> + Send + Sync>,
    pub memory: Arc<dyn Fn() -> Box<dyn MemoryStore> + Send + Sync>,
    pub toolsets: Arc<dyn Fn() -> Vec<Toolset> + Send + Sync>,
}

/// Result of one full batch run: the aggregate metric report plus
/// whether the run was cut short by cancellation.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: MetricReport,
    pub cancelled: bool,
    pub rows_written: usize,
}

/// Runs every `(trial, task_index)` pair through a fresh [`Engine`],
/// bounded by a worker pool of size W, writing one [`BatchRow`] per
/// completed job to an append-only output file and aggregating metrics
/// once the work list is drained (or cancellation cuts it short).
pub struct BatchRunner<A: Agent + 'static> {
    factories: JobFactories<A>,
    engine_config: EngineConfig,
    trace_root: PathBuf,
    concurrency: Arc<ConcurrencyGuard>,
    cancel: CancellationToken,
    adapter: Arc<dyn BenchmarkAdapter>,
    benchmark: String,
    split: String,
    num_trials: u64,
    shuffle_seed: Option<u64>,
    output_path: PathBuf,
    evaluation: Option<Arc<EvaluationSuite>>,
}

impl<A: Agent + 'static> BatchRunner<A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        factories: JobFactories<A>,
        engine_config: EngineConfig,
        trace_root: impl AsRef<std::path::Path>,
        worker_pool_size: u32,
        adapter: Arc<dyn BenchmarkAdapter>,
        benchmark: impl Into<String>,
        split: impl Into<String>,
        num_trials: u64,
        output_path: impl AsRef<std::path::Path>,
    ) -> Self {
        Self {
            factories,
            engine_config,
            trace_root: trace_root.as_ref().to_path_buf(),
            concurrency: Arc::new(ConcurrencyGuard::new(worker_pool_size)),
            cancel: CancellationToken::new(),
            adapter,
            benchmark: benchmark.into(),
            split: split.into(),
            num_trials,
            shuffle_seed: None,
            output_path: output_path.as_ref().to_path_buf(),
            evaluation: None,
        }
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_evaluation(mut self, suite: EvaluationSuite) -> Self {
        self.evaluation = Some(Arc::new(suite));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(&self) -> Result<BatchOutcome> {
        let records = self.adapter.load_records()?;
        let mut tasks = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            tasks.push(self.adapter.to_task(record, &self.split, idx)?);
        }
        let tasks = Arc::new(tasks);

        let work_list = build_work_list(self.num_trials, tasks.len(), self.shuffle_seed);
        let completed = completed_work_items(&self.output_path);
        if !completed.is_empty() {
            tracing::info!(resumed = completed.len(), "batch resume: skipping already-recorded work items");
        }
        let work_list = crate::work::filter_resumed(work_list, &completed);

        let writer = Arc::new(OutputWriter::open(&self.output_path)?);

        let mut handles = Vec::with_capacity(work_list.len());
        let mut cancelled = false;
        for item in work_list {
            loop {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
                if self.concurrency.try_acquire() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            if cancelled {
                break;
            }

            let task = tasks[item.task_index].clone();
            let agent = (self.factories.agent)();
            let llm = (self.factories.llm)();
            let registry = (self.factories.registry)();
            let memory = (self.factories.memory)();
            let toolsets = (self.factories.toolsets)();
            let engine_config = self.engine_config.clone();
            let trace_root = self.trace_root.clone();
            let cancel = self.cancel.clone();
            let concurrency = self.concurrency.clone();
            let writer = writer.clone();
            let evaluation = self.evaluation.clone();
            let benchmark = self.benchmark.clone();
            let split = self.split.clone();
            let trial = item.trial;
            let idx = item.task_index;

            handles.push(tokio::spawn(async move {
                let row = run_one_job(
                    agent, llm, registry, memory, toolsets, engine_config, trace_root, cancel, task, trial, idx, benchmark, split,
                    evaluation.as_deref(),
                )
                .await;
                concurrency.release();
                if let Err(err) = writer.append(&row) {
                    tracing::error!(error = %err, "failed to append batch row");
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        let rows = read_rows(&self.output_path);
        let rows_written = rows.len();
        let metric_inputs: Vec<MetricInput> = rows
            .into_iter()
            .map(|r| MetricInput { task_id: r.task_id, success: r.success, reward: r.reward, steps: r.steps, stop_reason: r.stop_reason })
            .collect();
        let report = compute_report(&metric_inputs, self.num_trials.max(1));

        Ok(BatchOutcome { report, cancelled, rows_written })
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_one_job<A: Agent + 'static>(
    agent: A,
    llm: Arc<dyn LlmClient>,
    registry: Arc<Registry>,
    memory: Box<dyn MemoryStore>,
    toolsets: Vec<Toolset>,
    engine_config: EngineConfig,
    trace_root: PathBuf,
    cancel: CancellationToken,
    task: Task,
    trial: u64,
    idx: usize,
    benchmark: String,
    split: String,
    evaluation: Option<&EvaluationSuite>,
) -> BatchRow {
    let started_at = Utc::now();
    let task_id = task.id.clone();
    let mut engine = Engine::new(agent, llm, registry, memory, engine_config, &trace_root).with_toolsets(toolsets).with_cancellation(cancel);

    let outcome = engine.run(task.clone()).await;
    let ended_at = Utc::now();
    let latency_seconds = (ended_at - started_at).num_milliseconds() as f64 / 1000.0;

    match outcome {
        Ok(run_result) => {
            let stop_reason = stop_reason_string(run_result.stop_reason);
            let (success, reward, eval_score, eval_details) = score(&task, &run_result, &stop_reason, evaluation);
            BatchRow {
                task_id,
                idx,
                trial,
                benchmark,
                split,
                reward,
                success,
                eval_score,
                eval_details,
                stop_reason,
                steps: run_result.step_count as u64,
                error: None,
                started_at,
                ended_at,
                latency_seconds,
            }
        }
        Err(err) => BatchRow {
            task_id,
            idx,
            trial,
            benchmark,
            split,
            reward: 0.0,
            success: false,
            eval_score: 0.0,
            eval_details: serde_json::Value::Null,
            stop_reason: "engine_error".to_string(),
            steps: 0,
            error: Some(err.to_string()),
            started_at,
            ended_at,
            latency_seconds,
        },
    }
}

fn score(
    task: &Task,
    run_result: &agentrt_engine::RunResult,
    stop_reason: &str,
    evaluation: Option<&EvaluationSuite>,
) -> (bool, f64, f64, serde_json::Value) {
    match evaluation {
        Some(suite) => {
            let context = EvaluationContext {
                task: task.clone(),
                manifest: serde_json::json!({"summary": {"stop_reason": stop_reason, "final_result": run_result.final_result}}),
                events: serde_json::json!([]),
                steps: serde_json::to_value(&run_result.records).unwrap_or(serde_json::json!([])),
                extras: serde_json::json!({}),
            };
            let result = suite.run(&context);
            let details = serde_json::to_value(&result.results).unwrap_or(serde_json::json!([]));
            (result.success, result.score, result.score, details)
        }
        None => {
            let success = matches!(run_result.stop_reason, StopReason::FinalAnswer);
            let score = if success { 1.0 } else { 0.0 };
            (success, score, score, serde_json::Value::Null)
        }
    }
}

fn stop_reason_string(reason: StopReason) -> String {
    serde_json::to_value(reason).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use agentrt_domain::{ActionResult, Decision, State};
    use agentrt_llm::ScriptedLlmClient;
    use agentrt_memory::WindowMemory;

    use super::*;
    use crate::adapter::InMemoryAdapter;

    /// Always asks for a final answer immediately — the batch runner
    /// doesn't exercise reasoning depth, only job isolation and
    /// aggregation, so one scripted response per job is enough.
    struct ImmediateAgent;

    impl Agent for ImmediateAgent {
        fn observe(&mut self, _state: &State) -> serde_json::Value {
            serde_json::json!({})
        }

        fn prepare(&mut self, _state: &State, _observation: &serde_json::Value) -> String {
            "solve it".to_string()
        }

        fn reduce(&mut self, _state: &mut State, _observation: &serde_json::Value, _decision: &Decision, _action_results: &[ActionResult]) {}
    }

    fn factories() -> JobFactories<ImmediateAgent> {
        JobFactories {
            agent: Arc::new(|| ImmediateAgent),
            llm: Arc::new(|| Arc::new(ScriptedLlmClient::new("scripted", ["Final Answer: ok"])) as Arc<dyn LlmClient>),
            registry: Arc::new(|| Arc::new(Registry::new())),
            memory: Arc::new(|| Box::new(WindowMemory::new(10)) as Box<dyn MemoryStore>),
            toolsets: Arc::new(|| Vec::<Toolset>::new()),
        }
    }

    fn runner(trace_dir: &std::path::Path, output_path: &std::path::Path, num_trials: u64) -> BatchRunner<ImmediateAgent> {
        let tasks = vec![Task::new("t1", "one"), Task::new("t2", "two")];
        let adapter: Arc<dyn BenchmarkAdapter> = Arc::new(InMemoryAdapter::new(tasks));
        BatchRunner::new(factories(), EngineConfig::new("scripted-model", 5), trace_dir, 2, adapter, "demo-bench", "test", num_trials, output_path)
    }

    #[tokio::test]
    async fn runs_every_trial_task_pair_and_reports_full_success() {
        let trace_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let output_path = out_dir.path().join("out.jsonl");
        let outcome = runner(trace_dir.path(), &output_path, 2).run().await.unwrap();

        assert_eq!(outcome.rows_written, 4);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.report.success_rate, 1.0);
        assert_eq!(outcome.report.pass_at_k[&1], 1.0);
    }

    #[tokio::test]
    async fn resuming_skips_rows_already_in_the_output_file() {
        let trace_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let output_path = out_dir.path().join("out.jsonl");

        runner(trace_dir.path(), &output_path, 1).run().await.unwrap();
        assert_eq!(read_rows(&output_path).len(), 2);

        // A second run over the same output file should find nothing left
        // to do — the work list is fully covered by prior rows.
        let outcome = runner(trace_dir.path(), &output_path, 1).run().await.unwrap();
        assert_eq!(outcome.rows_written, 2);
    }

    #[tokio::test]
    async fn concurrency_cap_is_never_exceeded_during_a_run() {
        let trace_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let output_path = out_dir.path().join("out.jsonl");
        let run = runner(trace_dir.path(), &output_path, 3);
        assert_eq!(run.concurrency.max(), 2);
        let outcome = run.run().await.unwrap();
        assert_eq!(outcome.rows_written, 6);
    }
}
