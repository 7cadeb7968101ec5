use std::sync::OnceLock;

use agentrt_domain::{Decision, ToolCall};
use regex::Regex;

use crate::scan::{coerce_scalar, find_paren_span, split_args_respecting_delimiters};
use crate::tool_call::validated_tool_call;

/// Which priority order `parse_text` follows. `Default` tries Action
/// forms before Final Answer; `ReAct` checks Final Answer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStyle {
    Default,
    ReAct,
}

fn action_invocation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Action\s*:\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

fn numbered_action() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Action\s*\d*\s*:\s*(\w+)\s*$").unwrap())
}

fn final_answer_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(final answer|answer|conclusion)\s*:|(done|finished)\.?\s*$").unwrap())
}

fn final_answer_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)(?:final answer|answer|conclusion)\s*:\s*(.+?)(?:\n\n|$)").unwrap())
}

fn thought_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*(?:thought|thinking|reasoning)\s*:\s*(.+)$").unwrap())
}

/// Parse `key=value, key=value` (or a bare remainder) into a JSON
/// object, using the scalar coercion order and falling back to
/// `{"input": args_str}` when no key/value pairs are found at all.
fn parse_invocation_args(args_str: &str) -> serde_json::Map<String, serde_json::Value> {
    let trimmed = args_str.trim();
    if trimmed.is_empty() {
        return serde_json::Map::new();
    }
    let mut result = serde_json::Map::new();
    for part in split_args_respecting_delimiters(trimmed) {
        if let Some(eq) = part.find('=') {
            let key = part[..eq].trim().to_string();
            let value = part[eq + 1..].trim();
            result.insert(key, coerce_scalar(value));
        }
    }
    if result.is_empty() {
        result.insert("input".into(), serde_json::json!(trimmed));
    }
    result
}

/// Extract every `Action: name(...)` function-invocation call found in
/// `text`. A call whose closing paren is missing is parsed as far as
/// the truncated text allows and returned without an error flag.
fn extract_function_invocations(text: &str, available_tools: &[String]) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    for m in action_invocation().find_iter(text) {
        let name = action_invocation().captures(&text[m.start()..m.end()]).unwrap().get(1).unwrap().as_str();
        let open_paren = m.end() - 1;
        let (end, closed) = find_paren_span(text, open_paren);
        let args_str = if closed { &text[open_paren + 1..end - 1] } else { &text[open_paren + 1..end] };
        let args = parse_invocation_args(args_str);
        calls.push(validated_tool_call(name, args, available_tools));
    }
    calls
}

/// Extract `Action N: name` followed on the next non-empty line by an
/// argument blob (JSON object or `key=value` list).
fn extract_numbered_actions(text: &str, available_tools: &[String]) -> Vec<ToolCall> {
    let lines: Vec<&str> = text.lines().collect();
    let mut calls = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some(caps) = numbered_action().captures(lines[i].trim()) {
            let name = caps.get(1).unwrap().as_str().to_string();
            let mut args = serde_json::Map::new();
            if let Some(next) = lines.get(i + 1) {
                let next = next.trim();
                if !next.is_empty() {
                    if next.starts_with('{') && next.ends_with('}') {
                        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(next) {
                            args = map;
                        }
                    } else {
                        args = parse_invocation_args(next);
                    }
                }
            }
            calls.push(validated_tool_call(&name, args, available_tools));
        }
        i += 1;
    }
    calls
}

fn contains_final_answer_marker(text: &str) -> bool {
    final_answer_marker().is_match(text)
}

fn extract_final_answer_field(text: &str) -> Option<String> {
    final_answer_field().captures(text).map(|c| c.get(1).unwrap().as_str().trim().to_string())
}

/// The ReAct/Default text parser: converts free-form model text into a
/// [`Decision`] using the function-invocation and numbered-action
/// forms, with the recovery rules from the data model (partial args on
/// truncation, synthesized `final` on total silence).
pub struct TextParser {
    pub style: ParserStyle,
}

impl TextParser {
    pub fn new(style: ParserStyle) -> Self {
        Self { style }
    }

    pub fn parse(&self, text: &str, available_tools: &[String]) -> Decision {
        if self.style == ParserStyle::ReAct && contains_final_answer_marker(text) {
            let answer = extract_final_answer_field(text).unwrap_or_else(|| text.trim().to_string());
            return Decision::Final { final_answer: answer };
        }
        self.parse_action_forms(text, available_tools)
    }

    fn parse_action_forms(&self, text: &str, available_tools: &[String]) -> Decision {
        let invocations = extract_function_invocations(text, available_tools);
        if !invocations.is_empty() {
            return Decision::Act { actions: invocations, rationale: extract_rationale(text) };
        }

        let numbered = extract_numbered_actions(text, available_tools);
        if !numbered.is_empty() {
            return Decision::Act { actions: numbered, rationale: extract_rationale(text) };
        }

        if let Some(answer) = extract_final_answer_field(text) {
            return Decision::Final { final_answer: answer };
        }

        // Recovery: model surrender — no action, no final answer field.
        Decision::Final { final_answer: text.trim().to_string() }
    }
}

fn extract_rationale(text: &str) -> Option<String> {
    thought_field().captures(text).map(|c| c.get(1).unwrap().as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_parser() -> TextParser {
        TextParser::new(ParserStyle::Default)
    }

    #[test]
    fn parses_function_invocation_with_typed_args() {
        let decision = default_parser().parse("Action: add(a=1, b=2)", &["add".into()]);
        match decision {
            Decision::Act { actions, .. } => {
                assert_eq!(actions[0].name, "add");
                assert_eq!(actions[0].args["a"], 1);
                assert_eq!(actions[0].args["b"], 2);
                assert!(actions[0].error.is_none());
            }
            other => panic!("expected act, got {other:?}"),
        }
    }

    #[test]
    fn recovers_partial_args_on_missing_close_paren() {
        let decision = default_parser().parse("Thought: x\nAction: foo(a=1, b=", &["foo".into()]);
        match decision {
            Decision::Act { actions, .. } => {
                assert_eq!(actions.len(), 1);
                assert_eq!(actions[0].name, "foo");
                assert_eq!(actions[0].args["a"], 1);
                assert_eq!(actions[0].args["b"], "");
                assert!(actions[0].error.is_none());
            }
            other => panic!("expected act with partial args, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tool_carries_error_but_mode_stays_act() {
        let decision = default_parser().parse("Action: mystery(x=1)", &["add".into()]);
        match decision {
            Decision::Act { actions, .. } => {
                assert_eq!(actions[0].error.as_deref().unwrap(), "Unknown tool: mystery. Available tools: add");
            }
            other => panic!("expected act, got {other:?}"),
        }
    }

    #[test]
    fn no_action_no_final_answer_synthesizes_final_from_raw_text() {
        let decision = default_parser().parse("I am thinking about it", &["add".into()]);
        match decision {
            Decision::Final { final_answer } => assert_eq!(final_answer, "I am thinking about it"),
            other => panic!("expected final, got {other:?}"),
        }
    }

    #[test]
    fn default_style_prefers_action_over_final_answer_when_both_present() {
        let text = "Action: add(a=1,b=1)\nFinal Answer: not yet";
        let decision = default_parser().parse(text, &["add".into()]);
        assert!(matches!(decision, Decision::Act { .. }));
    }

    #[test]
    fn react_style_checks_final_answer_before_action() {
        let parser = TextParser::new(ParserStyle::ReAct);
        let text = "Final Answer: 42\nAction: add(a=1,b=1)";
        let decision = parser.parse(text, &["add".into()]);
        match decision {
            Decision::Final { final_answer } => assert_eq!(final_answer, "42"),
            other => panic!("expected final, got {other:?}"),
        }
    }

    #[test]
    fn numbered_action_form_with_json_args() {
        let text = "Action 1: add\n{\"a\": 1, \"b\": 2}";
        let decision = default_parser().parse(text, &["add".into()]);
        match decision {
            Decision::Act { actions, .. } => {
                assert_eq!(actions[0].name, "add");
                assert_eq!(actions[0].args["a"], 1);
            }
            other => panic!("expected act, got {other:?}"),
        }
    }
}
