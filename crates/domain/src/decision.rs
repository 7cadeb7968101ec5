use serde::{Deserialize, Serialize};

/// A single tool invocation request produced by the decision parser.
///
/// `error` is set if and only if this call could not be matched against
/// the available tool set or could not be fully parsed — it is *not* an
/// execution error (those live in [`crate::action_result::ActionResult`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { name: name.into(), args, error: None }
    }

    pub fn with_error(name: impl Into<String>, args: serde_json::Map<String, serde_json::Value>, error: impl Into<String>) -> Self {
        Self { name: name.into(), args, error: Some(error.into()) }
    }
}

/// What the agent wants the engine to do next, as produced by the
/// decision parser from one turn of raw LLM text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Decision {
    Act { actions: Vec<ToolCall>, #[serde(default)] rationale: Option<String> },
    Final { final_answer: String },
    Wait { #[serde(default)] rationale: Option<String> },
    Error { error_message: String },
}

impl Decision {
    pub fn is_final(&self) -> bool {
        matches!(self, Decision::Final { .. })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Decision::Act { .. } => "act",
            Decision::Final { .. } => "final",
            Decision::Wait { .. } => "wait",
            Decision::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_use_snake_case_tags() {
        assert_eq!(Decision::Act { actions: vec![], rationale: None }.mode(), "act");
        assert_eq!(Decision::Final { final_answer: "x".into() }.mode(), "final");
        assert_eq!(Decision::Wait { rationale: None }.mode(), "wait");
        assert_eq!(Decision::Error { error_message: "x".into() }.mode(), "error");
    }

    #[test]
    fn act_decision_serializes_tagged() {
        let decision = Decision::Act { actions: vec![ToolCall::new("add", Default::default())], rationale: None };
        let v = serde_json::to_value(&decision).unwrap();
        assert_eq!(v["mode"], "act");
        assert_eq!(v["actions"][0]["name"], "add");
    }
}
