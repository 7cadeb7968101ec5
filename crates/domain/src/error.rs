/// Shared error type used across the runtime's crates.
///
/// Nothing below the FSM engine boundary is allowed to let one of these
/// escape as an exception — engine-internal code catches every variant
/// it can produce and folds it into the trace instead. The crates in this
/// workspace use this enum (or a crate-local enum with a `#[from]` back
/// into it) for everything that isn't a programmer error at an API entry
/// point.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("task invalid: {0}")]
    InvalidTask(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
