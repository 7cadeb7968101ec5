pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use crate::context::{EvaluationContext, EvaluationResult, Evaluator};

/// Evaluates a restricted boolean expression against a fixed scope of
/// `{task, manifest, events, steps, extras}`. Grammar and evaluation are
/// both hand-rolled (see [`ast`]/[`parser`]/[`eval`]) rather than reusing
/// a scripting engine, so the allowed node set is a property of the
/// parser, not a runtime allow-list.
pub struct DslEvaluator {
    pub name: String,
    pub expression: String,
}

impl DslEvaluator {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self { name: name.into(), expression: expression.into() }
    }
}

impl Evaluator for DslEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let outcome = (|| -> Result<bool, String> {
            let expr = parser::parse(&self.expression)?;
            let mut scope = std::collections::HashMap::new();
            scope.insert("task", serde_json::to_value(&context.task).map_err(|e| e.to_string())?);
            scope.insert("manifest", context.manifest.clone());
            scope.insert("events", context.events.clone());
            scope.insert("steps", context.steps.clone());
            scope.insert("extras", context.extras.clone());
            let value = eval::eval(&expr, &scope)?;
            Ok(value.as_bool().unwrap_or(false))
        })();

        match outcome {
            Ok(true) => EvaluationResult::pass(&self.name),
            Ok(false) => EvaluationResult::fail(&self.name, "dsl_expression_false"),
            Err(e) => EvaluationResult::fail(&self.name, format!("dsl_error:{e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use agentrt_domain::Task;

    use super::*;

    fn context() -> EvaluationContext {
        EvaluationContext {
            task: Task::new("t1", "obj"),
            manifest: serde_json::json!({"summary": {"steps": 3}}),
            events: serde_json::json!([]),
            steps: serde_json::json!([]),
            extras: serde_json::json!({}),
        }
    }

    #[test]
    fn passing_expression_succeeds() {
        let evaluator = DslEvaluator::new("dsl", "manifest.summary.steps == 3");
        assert!(evaluator.evaluate(&context()).success);
    }

    #[test]
    fn disallowed_syntax_fails_without_crashing() {
        let evaluator = DslEvaluator::new("dsl", "__import__('os')");
        let result = evaluator.evaluate(&context());
        assert!(!result.success);
        assert!(result.reasons[0].starts_with("dsl_error"));
    }
}
