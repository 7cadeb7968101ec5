use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use agentrt_domain::{ActionResult, Error, Result};

use crate::tool::{run_catching_panics, Tool};

/// Name-keyed lookup table mapping tool names to live implementations,
/// plus the dispatch entry point that turns a name+args pair into an
/// [`ActionResult`] without ever letting the tool's own panics or errors
/// escape as a Rust error.
#[derive(Default)]
pub struct Registry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name. Fails if the name is already
    /// taken unless `replace` is `true`.
    pub fn register(&mut self, tool: Arc<dyn Tool>, replace: bool) -> Result<()> {
        let def = tool.definition();
        let name = def.name.clone();
        if !replace && self.tools.contains_key(&name) {
            return Err(Error::Other(format!("tool '{name}' already registered")));
        }
        tracing::debug!(tool = %name, permissions = ?def.permissions, "registering tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Render the registered tools as `name: description (params: ...)`
    /// lines, sorted by name, for substitution into a system prompt's
    /// `{{tool_schema}}` placeholder. Permissions are not surfaced to the
    /// model — they gate dispatch, not prompting — but the parameter
    /// schema is, so the model knows what shape of arguments to emit.
    pub fn tool_schema(&self) -> String {
        let mut names = self.names();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let tool = self.tools.get(&name).expect("name came from this map");
                let def = tool.definition();
                format!("- {}: {} (params: {})", def.name, def.description, def.parameter_schema)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Look up, validate, and execute one call, timing it and catching
    /// both panics and a configured per-tool timeout.
    pub async fn dispatch(&self, name: &str, args: serde_json::Map<String, serde_json::Value>) -> ActionResult {
        let Some(tool) = self.get(name) else {
            return ActionResult::error(
                format!("tool_not_found: '{name}'. Available tools: {}", self.names().join(", ")),
                "tool_not_found",
                &args,
            );
        };

        let missing = tool.definition().missing_params(&args);
        if !missing.is_empty() {
            return ActionResult::error(format!("missing required parameters: {}", missing.join(", ")), "validation_error", &args);
        }

        let started = Instant::now();
        let result = match tool.definition().timeout {
            Some(timeout) => match tokio::time::timeout(timeout, run_catching_panics(tool.as_ref(), args.clone())).await {
                Ok(result) => result,
                Err(_) => ActionResult::error(format!("tool '{name}' timed out after {timeout:?}"), "timeout", &args),
            },
            None => run_catching_panics(tool.as_ref(), args.clone()).await,
        };
        result.with_duration(started.elapsed().as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::tool::ToolDefinition;

    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("echo", "echoes its input").requiring(["text"]))
        }

        async fn run(&self, args: serde_json::Map<String, serde_json::Value>) -> ActionResult {
            ActionResult::success(args)
        }
    }

    struct Panics;

    #[async_trait]
    impl Tool for Panics {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("boom", "always panics"))
        }

        async fn run(&self, _args: serde_json::Map<String, serde_json::Value>) -> ActionResult {
            panic!("kaboom")
        }
    }

    struct Slow;

    #[async_trait]
    impl Tool for Slow {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("slow", "sleeps").with_timeout(Duration::from_millis(10)))
        }

        async fn run(&self, _args: serde_json::Map<String, serde_json::Value>) -> ActionResult {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ActionResult::success(Default::default())
        }
    }

    #[tokio::test]
    async fn unknown_tool_reports_available_names() {
        let registry = Registry::new();
        let result = registry.dispatch("missing", Default::default()).await;
        assert!(result.is_error());
        assert_eq!(result.payload["error_type"], "tool_not_found");
    }

    #[tokio::test]
    async fn missing_required_param_is_validation_error() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Echo), false).unwrap();
        let result = registry.dispatch("echo", Default::default()).await;
        assert!(result.is_error());
        assert_eq!(result.payload["error_type"], "validation_error");
    }

    #[tokio::test]
    async fn successful_call_returns_payload_and_duration() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Echo), false).unwrap();
        let mut args = serde_json::Map::new();
        args.insert("text".into(), serde_json::json!("hi"));
        let result = registry.dispatch("echo", args).await;
        assert!(!result.is_error());
        assert_eq!(result.payload["text"], "hi");
        assert!(result.duration_ms.is_some());
    }

    #[tokio::test]
    async fn panicking_tool_becomes_an_error_result() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Panics), false).unwrap();
        let result = registry.dispatch("boom", Default::default()).await;
        assert!(result.is_error());
        assert_eq!(result.payload["error_type"], "panic");
    }

    #[tokio::test]
    async fn timed_out_tool_reports_timeout() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Slow), false).unwrap();
        let result = registry.dispatch("slow", Default::default()).await;
        assert!(result.is_error());
        assert_eq!(result.payload["error_type"], "timeout");
    }

    #[test]
    fn tool_schema_lists_names_and_descriptions_sorted() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Panics), false).unwrap();
        registry.register(Arc::new(Echo), false).unwrap();
        let schema = registry.tool_schema();
        let echo_pos = schema.find("echo").unwrap();
        let boom_pos = schema.find("boom").unwrap();
        assert!(boom_pos < echo_pos);
        assert!(schema.contains("echoes its input"));
    }

    #[test]
    fn duplicate_registration_without_replace_fails() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Echo), false).unwrap();
        assert!(registry.register(Arc::new(Echo), false).is_err());
        assert!(registry.register(Arc::new(Echo), true).is_ok());
    }
}
