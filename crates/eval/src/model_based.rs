use agentrt_domain::Message;
use agentrt_llm::LlmClient;

use crate::context::{EvaluationContext, EvaluationResult, Evaluator};

/// Asks an LLM client for a `{success, score, reason}` JSON verdict and
/// returns the parsed result. Synchronous callers use
/// [`ModelBasedEvaluator::evaluate_async`] directly; the blanket
/// [`Evaluator::evaluate`] impl is not provided for this evaluator since
/// scoring genuinely requires an await point — callers outside an async
/// context should prefer [`crate::rule_based::RuleBasedEvaluator`] or
/// [`crate::dsl::DslEvaluator`].
pub struct ModelBasedEvaluator {
    pub name: String,
    pub prompt_template: String,
}

impl ModelBasedEvaluator {
    pub fn new(name: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self { name: name.into(), prompt_template: prompt_template.into() }
    }

    pub async fn evaluate_async(&self, client: &dyn LlmClient, context: &EvaluationContext) -> EvaluationResult {
        let transcript = serde_json::json!({
            "task": context.task,
            "manifest": context.manifest,
            "steps": context.steps,
        });
        let prompt = format!("{}\n\n{}", self.prompt_template, transcript);
        let response = match client.complete(&[Message::user(prompt)]).await {
            Ok(text) => text,
            Err(e) => return EvaluationResult::fail(&self.name, format!("llm_error:{e}")),
        };

        let parsed: serde_json::Value = match serde_json::from_str(response.trim()) {
            Ok(v) => v,
            Err(e) => return EvaluationResult::fail(&self.name, format!("unparseable_verdict:{e}")),
        };

        let success = parsed.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
        let score = parsed.get("score").and_then(|v| v.as_f64()).unwrap_or(if success { 1.0 } else { 0.0 });
        let reason = parsed.get("reason").and_then(|v| v.as_str()).map(String::from);

        EvaluationResult {
            name: self.name.clone(),
            success,
            score,
            reasons: reason.into_iter().collect(),
            evidence: parsed.as_object().cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use agentrt_domain::Task;
    use agentrt_llm::ScriptedLlmClient;

    use super::*;

    fn context() -> EvaluationContext {
        EvaluationContext {
            task: Task::new("t1", "obj"),
            manifest: serde_json::json!({}),
            events: serde_json::json!([]),
            steps: serde_json::json!([]),
            extras: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn parses_a_well_formed_verdict() {
        let client = ScriptedLlmClient::new("judge", [r#"{"success": true, "score": 0.9, "reason": "looks right"}"#]);
        let evaluator = ModelBasedEvaluator::new("judge", "Did the agent succeed?");
        let result = evaluator.evaluate_async(&client, &context()).await;
        assert!(result.success);
        assert_eq!(result.score, 0.9);
    }

    #[tokio::test]
    async fn malformed_verdict_fails_without_panicking() {
        let client = ScriptedLlmClient::new("judge", ["not json"]);
        let evaluator = ModelBasedEvaluator::new("judge", "Did the agent succeed?");
        let result = evaluator.evaluate_async(&client, &context()).await;
        assert!(!result.success);
    }
}
