/// Failures the batch runner can return from [`crate::runner::BatchRunner::run`]
/// itself, as opposed to a single job faulting (which becomes a row with
/// `error` set, per the engine's own propagation policy).
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("output file: {0}")]
    Output(#[from] std::io::Error),

    #[error("output row serialization: {0}")]
    Row(#[from] serde_json::Error),

    #[error("benchmark adapter: {0}")]
    Adapter(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
