use std::time::Duration;

/// Tunables resolved once at engine construction. A task's own
/// `budget.max_steps`/`budget.max_runtime_seconds`, when present,
/// override the corresponding field here for that one run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_steps: u32,
    pub max_runtime: Option<Duration>,
    pub model_id: String,
    pub seed: u64,
    pub parser_style: agentrt_parser::ParserStyle,
}

impl EngineConfig {
    pub fn new(model_id: impl Into<String>, max_steps: u32) -> Self {
        Self {
            max_steps,
            max_runtime: None,
            model_id: model_id.into(),
            seed: 0,
            parser_style: agentrt_parser::ParserStyle::Default,
        }
    }

    pub fn with_max_runtime(mut self, max_runtime: Duration) -> Self {
        self.max_runtime = Some(max_runtime);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parser_style(mut self, style: agentrt_parser::ParserStyle) -> Self {
        self.parser_style = style;
        self
    }
}

/// User-supplied early-stop predicate, checked before each LLM call
/// against the state and the previous step's raw response (`None` on
/// the first step). Returning `true` sets `stop_reason = custom_criteria`.
pub type StoppingCriteria = Box<dyn Fn(&agentrt_domain::State, Option<&str>) -> bool + Send + Sync>;
