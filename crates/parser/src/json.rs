use agentrt_domain::{Decision, ToolCall};
use serde_json::Value;

use crate::scan::find_balanced_object;
use crate::tool_call::{build_tool_call, unknown_tool_error};

/// Look up an object key case-insensitively, trying each candidate in
/// order and returning the first match.
fn get_ci<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        for (k, v) in obj.iter() {
            if k.eq_ignore_ascii_case(key) {
                return Some(v);
            }
        }
    }
    None
}

/// Attempt to build a [`Decision`] from the first balanced JSON object
/// found in `text` whose keys match the recognized decision vocabulary.
/// Returns `None` (never an error Decision) when no such object is
/// found or it doesn't carry a recognized shape — the caller falls
/// through to the next parser flavor in that case.
pub fn parse_json_decision(text: &str, available_tools: &[String]) -> Option<Decision> {
    let (start, end) = find_balanced_object(text, 0)?;
    let value: Value = serde_json::from_str(&text[start..end]).ok()?;
    let obj = value.as_object()?;

    let mode = get_ci(obj, &["mode"]).and_then(Value::as_str).map(str::to_ascii_lowercase);

    match mode.as_deref() {
        Some("final") => {
            let answer = get_ci(obj, &["final_answer"]).and_then(Value::as_str).unwrap_or_default();
            Some(Decision::Final { final_answer: answer.to_string() })
        }
        Some("wait") => {
            let rationale = get_ci(obj, &["rationale", "thinking", "reflection"]).and_then(Value::as_str).map(String::from);
            Some(Decision::Wait { rationale })
        }
        Some("error") => {
            let message = get_ci(obj, &["error_message", "message"]).and_then(Value::as_str).unwrap_or("unknown error");
            Some(Decision::Error { error_message: message.to_string() })
        }
        Some("act") | None => build_act_decision(obj, available_tools),
        _ => None,
    }
}

fn build_act_decision(obj: &serde_json::Map<String, Value>, available_tools: &[String]) -> Option<Decision> {
    let rationale = get_ci(obj, &["rationale", "thinking", "reflection"]).and_then(Value::as_str).map(String::from);

    if let Some(actions) = get_ci(obj, &["actions"]).and_then(Value::as_array) {
        let calls: Vec<ToolCall> = actions
            .iter()
            .filter_map(|a| a.as_object())
            .map(|a| tool_call_from_object(a, available_tools))
            .collect();
        if calls.is_empty() {
            return None;
        }
        return Some(Decision::Act { actions: calls, rationale });
    }

    if let Some(action) = get_ci(obj, &["action"]).and_then(Value::as_object) {
        return Some(Decision::Act { actions: vec![tool_call_from_object(action, available_tools)], rationale });
    }

    if let Some(final_answer) = get_ci(obj, &["final_answer"]).and_then(Value::as_str) {
        return Some(Decision::Final { final_answer: final_answer.to_string() });
    }

    None
}

fn tool_call_from_object(obj: &serde_json::Map<String, Value>, available_tools: &[String]) -> ToolCall {
    let name = get_ci(obj, &["name", "tool", "function"]).and_then(Value::as_str).unwrap_or_default();
    let args = get_ci(obj, &["args", "arguments", "parameters"]).and_then(Value::as_object).cloned().unwrap_or_default();

    if name.is_empty() {
        return ToolCall::with_error("", args, "missing tool name");
    }
    if !available_tools.iter().any(|t| t == name) {
        return ToolCall::with_error(name, args, unknown_tool_error(name, available_tools));
    }
    build_tool_call(name, args)
}
