use agentrt_domain::ToolCall;

pub fn build_tool_call(name: &str, args: serde_json::Map<String, serde_json::Value>) -> ToolCall {
    ToolCall::new(name, args)
}

pub fn unknown_tool_error(name: &str, available_tools: &[String]) -> String {
    format!("Unknown tool: {name}. Available tools: {}", available_tools.join(", "))
}

/// Validate a freshly parsed tool name against the available set,
/// returning a [`ToolCall`] with `error` populated when the name is
/// unknown. The Decision's mode is never changed by this — only the
/// individual call carries the error.
pub fn validated_tool_call(
    name: &str,
    args: serde_json::Map<String, serde_json::Value>,
    available_tools: &[String],
) -> ToolCall {
    if !available_tools.iter().any(|t| t == name) {
        return ToolCall::with_error(name, args.clone(), unknown_tool_error(name, available_tools));
    }
    build_tool_call(name, args)
}
