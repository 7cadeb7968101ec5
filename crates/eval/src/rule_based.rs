use crate::context::{EvaluationContext, EvaluationResult, Evaluator};

/// Checks stop_reason membership, a minimum reward, required substrings
/// in the final result, and required payload keys — a pure function of
/// the already-materialized trace data, no model call involved.
pub struct RuleBasedEvaluator {
    pub name: String,
    pub allowed_stop_reasons: Vec<String>,
    pub min_reward: Option<f64>,
    pub required_substrings: Vec<String>,
    pub required_payload_keys: Vec<String>,
}

impl RuleBasedEvaluator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), allowed_stop_reasons: Vec::new(), min_reward: None, required_substrings: Vec::new(), required_payload_keys: Vec::new() }
    }

    pub fn allowing_stop_reasons(mut self, reasons: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_stop_reasons = reasons.into_iter().map(Into::into).collect();
        self
    }

    pub fn requiring_min_reward(mut self, reward: f64) -> Self {
        self.min_reward = Some(reward);
        self
    }

    pub fn requiring_substrings(mut self, subs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_substrings = subs.into_iter().map(Into::into).collect();
        self
    }

    pub fn requiring_payload_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_payload_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

impl Evaluator for RuleBasedEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let mut reasons = Vec::new();

        if !self.allowed_stop_reasons.is_empty() {
            let stop_reason = context.manifest["summary"]["stop_reason"].as_str().unwrap_or("");
            if !self.allowed_stop_reasons.iter().any(|r| r == stop_reason) {
                reasons.push(format!("stop_reason '{stop_reason}' not in allowed set"));
            }
        }

        if let Some(min_reward) = self.min_reward {
            let reward = context.extras.get("reward").and_then(|v| v.as_f64()).unwrap_or(f64::MIN);
            if reward < min_reward {
                reasons.push(format!("reward {reward} below minimum {min_reward}"));
            }
        }

        let final_result = context.manifest["summary"]["final_result"].as_str().unwrap_or("");
        for needle in &self.required_substrings {
            if !final_result.contains(needle.as_str()) {
                reasons.push(format!("final result missing required substring '{needle}'"));
            }
        }

        for key in &self.required_payload_keys {
            if context.extras.get(key).is_none() {
                reasons.push(format!("missing required payload key '{key}'"));
            }
        }

        if reasons.is_empty() {
            EvaluationResult::pass(&self.name)
        } else {
            let mut result = EvaluationResult::fail(&self.name, reasons.join("; "));
            result.reasons = reasons;
            result
        }
    }
}
