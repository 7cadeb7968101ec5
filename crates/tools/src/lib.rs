//! Tool registry, dispatcher, and toolset lifecycle.
//!
//! A tool implements [`Tool`]; [`Registry`] holds the name-keyed lookup
//! table and turns `dispatch(name, args)` into a uniform
//! `ActionResult`, catching panics, enforcing per-tool timeouts, and
//! validating required parameters before a call ever reaches the
//! implementation. [`Toolset`] groups tools with optional setup/
//! teardown hooks the engine runs at the edges of a task run.

pub mod registry;
pub mod tool;
pub mod toolset;

pub use registry::Registry;
pub use tool::{Tool, ToolDefinition};
pub use toolset::{setup_all, teardown_all, Toolset, ToolsetContext};
