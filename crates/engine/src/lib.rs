//! The FSM engine: drives an [`Agent`] through observe → decide → act →
//! reduce until a terminal stop reason is reached, emitting a trace via
//! `agentrt-trace` as it goes. See [`Engine::run`] for the one-step
//! algorithm this module implements.

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod run_result;

pub use agent::Agent;
pub use config::{EngineConfig, StoppingCriteria};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use run_result::RunResult;
