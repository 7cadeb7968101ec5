use serde::{Deserialize, Serialize};

/// A role in an LLM chat transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in the ordered sequence sent to the LLM client contract.
///
/// The runtime deliberately keeps content as plain text — tool-call
/// extensions and multi-part content belong to provider adapters, which
/// are out of scope here; any structure a provider returns must already
/// be serialized into text by the time it reaches the decision parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }
}
