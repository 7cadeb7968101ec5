use std::panic::AssertUnwindSafe;
use std::time::Duration;

use agentrt_domain::ActionResult;
use futures_util::FutureExt;

/// Static shape of a registered tool: what the dispatcher needs to
/// validate a call before it ever reaches [`Tool::run`].
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameter_schema: serde_json::Value,
    pub required_params: Vec<String>,
    pub permissions: Vec<String>,
    pub timeout: Option<Duration>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema: serde_json::Value::Object(Default::default()),
            required_params: Vec::new(),
            permissions: Vec::new(),
            timeout: None,
        }
    }

    pub fn requiring(mut self, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameter_schema(mut self, schema: serde_json::Value) -> Self {
        self.parameter_schema = schema;
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn missing_params(&self, args: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
        self.required_params.iter().filter(|p| !args.contains_key(p.as_str())).cloned().collect()
    }
}

/// A single callable capability the engine can dispatch to.
///
/// `run` never panics in the sense the caller needs to worry about — the
/// [`crate::registry::Registry`] wraps every call in `catch_unwind` so a
/// panicking implementation still produces an `ActionResult`, not a
/// crashed engine.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn run(&self, args: serde_json::Map<String, serde_json::Value>) -> ActionResult;
}

/// Run `tool` against `args`, converting a panic into an error
/// [`ActionResult`] instead of propagating it. Does not apply a timeout;
/// callers that have one configured wrap this in `tokio::time::timeout`.
pub async fn run_catching_panics(tool: &dyn Tool, args: serde_json::Map<String, serde_json::Value>) -> ActionResult {
    match AssertUnwindSafe(tool.run(args.clone())).catch_unwind().await {
        Ok(result) => result,
        Err(_) => ActionResult::error(format!("tool '{}' panicked", tool.definition().name), "panic", &args),
    }
}
