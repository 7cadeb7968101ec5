use agentrt_domain::Task;

/// Everything an evaluator needs to score one finished run. `manifest`,
/// `events`, and `steps` are the already-deserialized JSON bodies of the
/// corresponding trace files (callers typically build this straight
/// from a freshly-finalized [`agentrt_trace::Manifest`] plus the two
/// JSONL files, serialized back to `Value` so this crate doesn't need a
/// dependency on the trace crate itself).
pub struct EvaluationContext {
    pub task: Task,
    pub manifest: serde_json::Value,
    pub events: serde_json::Value,
    pub steps: serde_json::Value,
    pub extras: serde_json::Value,
}

/// One evaluator's verdict.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EvaluationResult {
    pub name: String,
    pub success: bool,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub evidence: serde_json::Map<String, serde_json::Value>,
}

impl EvaluationResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self { name: name.into(), success: true, score: 1.0, reasons: Vec::new(), evidence: Default::default() }
    }

    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { name: name.into(), success: false, score: 0.0, reasons: vec![reason.into()], evidence: Default::default() }
    }
}

/// An evaluator scores a finished run; implementations never panic on a
/// malformed context — a contradiction in the scope (e.g. a dangling
/// field reference) becomes a failing [`EvaluationResult`], not an error.
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult;
}
