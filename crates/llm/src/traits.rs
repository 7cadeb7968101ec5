use agentrt_domain::{Message, Result};

/// The seam between the engine and whatever actually produces completions.
///
/// A real deployment would plug in an HTTP-backed adapter here; this
/// crate only defines the contract and ships the in-memory
/// [`crate::scripted::ScriptedLlmClient`] used throughout the test suite
/// and the batch runner's dry-run mode.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the full conversation so far and get back one turn of raw
    /// completion text, to be handed to the decision parser unmodified.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// A unique identifier for this client instance, used in trace metadata.
    fn client_id(&self) -> &str;
}
