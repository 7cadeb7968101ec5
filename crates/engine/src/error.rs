use agentrt_domain::TaskValidationIssue;

/// Errors the engine can return from [`crate::engine::Engine::run`]
/// before a run ever reaches its per-step error handling.
///
/// Every failure that happens *during* a run — LLM transport errors,
/// tool faults, parse failures, and toolset/trace infrastructure
/// failures alike — is absorbed into the run as a `fatal_error` stop
/// reason instead of surfacing here. Per §4.1's state machine, "failure
/// to write a trace record is treated as fatal_error", not as an
/// escaping exception. This type only carries the one true
/// precondition §4.1 calls a programmer error: a structurally invalid
/// task. There is no "null engine" variant either: the engine's LLM
/// client and tool registry are constructor arguments, not optional
/// fields, so that precondition is enforced by the type system instead
/// of at run time.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("task failed structural validation: {0:?}")]
    InvalidTask(Vec<TaskValidationIssue>),
}

pub type Result<T> = std::result::Result<T, EngineError>;
