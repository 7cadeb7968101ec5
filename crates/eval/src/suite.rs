use crate::context::{EvaluationContext, EvaluationResult, Evaluator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteMode {
    All,
    Any,
    MeanScore,
}

#[derive(Debug, Clone)]
pub struct SuiteResult {
    pub success: bool,
    pub score: f64,
    pub results: Vec<EvaluationResult>,
}

/// Combines evaluators under one aggregation mode: `All` requires every
/// evaluator to succeed, `Any` requires at least one, `MeanScore`
/// ignores individual success and thresholds the mean score at 0.5.
pub struct EvaluationSuite {
    pub mode: SuiteMode,
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl EvaluationSuite {
    pub fn new(mode: SuiteMode, evaluators: Vec<Box<dyn Evaluator>>) -> Self {
        Self { mode, evaluators }
    }

    pub fn run(&self, context: &EvaluationContext) -> SuiteResult {
        let results: Vec<EvaluationResult> = self.evaluators.iter().map(|e| e.evaluate(context)).collect();
        let mean_score = if results.is_empty() { 0.0 } else { results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64 };
        let success = match self.mode {
            SuiteMode::All => !results.is_empty() && results.iter().all(|r| r.success),
            SuiteMode::Any => results.iter().any(|r| r.success),
            SuiteMode::MeanScore => mean_score >= 0.5,
        };
        tracing::debug!(mode = ?self.mode, success, score = mean_score, evaluators = results.len(), "evaluation suite run complete");
        SuiteResult { success, score: mean_score, results }
    }
}

#[cfg(test)]
mod tests {
    use agentrt_domain::Task;

    use crate::rule_based::RuleBasedEvaluator;

    use super::*;

    fn context() -> EvaluationContext {
        EvaluationContext {
            task: Task::new("t1", "obj"),
            manifest: serde_json::json!({"summary": {"stop_reason": "final_answer", "final_result": "ok"}}),
            events: serde_json::json!([]),
            steps: serde_json::json!([]),
            extras: serde_json::json!({}),
        }
    }

    #[test]
    fn all_mode_requires_every_evaluator_to_pass() {
        let suite = EvaluationSuite::new(
            SuiteMode::All,
            vec![
                Box::new(RuleBasedEvaluator::new("a").allowing_stop_reasons(["final_answer"])),
                Box::new(RuleBasedEvaluator::new("b").allowing_stop_reasons(["cancelled"])),
            ],
        );
        let result = suite.run(&context());
        assert!(!result.success);
        assert_eq!(result.results.len(), 2);
    }

    #[test]
    fn any_mode_passes_if_one_evaluator_passes() {
        let suite = EvaluationSuite::new(
            SuiteMode::Any,
            vec![
                Box::new(RuleBasedEvaluator::new("a").allowing_stop_reasons(["final_answer"])),
                Box::new(RuleBasedEvaluator::new("b").allowing_stop_reasons(["cancelled"])),
            ],
        );
        assert!(suite.run(&context()).success);
    }
}
