pub mod scripted;
pub mod traits;

pub use scripted::ScriptedLlmClient;
pub use traits::LlmClient;
