use parking_lot::Mutex;

use agentrt_domain::{Error, Message, Result};

use crate::traits::LlmClient;

/// A client that replays a fixed queue of responses, one per call, in
/// order. Used by engine and batch tests to drive deterministic runs
/// without a real model behind the scenes. The queue is consumed
/// destructively; calling past the end of the script is a test bug, not
/// a recoverable condition, so it returns an error rather than looping.
pub struct ScriptedLlmClient {
    id: String,
    responses: Mutex<std::collections::VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new(id: impl Into<String>, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The conversation passed to `complete` on each call so far, in order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.lock().push(messages.to_vec());
        self.responses.lock().pop_front().ok_or_else(|| {
            let calls = self.calls.lock().len();
            tracing::warn!(client_id = %self.id, calls, "scripted client exhausted its response queue");
            Error::Other(format!("{}: script exhausted after {calls} calls", self.id))
        })
    }

    fn client_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_responses_in_order() {
        let client = ScriptedLlmClient::new("test", ["first", "second"]);
        assert_eq!(client.complete(&[]).await.unwrap(), "first");
        assert_eq!(client.complete(&[]).await.unwrap(), "second");
        assert!(client.complete(&[]).await.is_err());
    }

    #[tokio::test]
    async fn records_the_conversation_for_each_call() {
        let client = ScriptedLlmClient::new("test", ["ok"]);
        let messages = vec![Message::user("hi")];
        client.complete(&messages).await.unwrap();
        assert_eq!(client.calls().len(), 1);
        assert_eq!(client.calls()[0][0].content, "hi");
    }
}
