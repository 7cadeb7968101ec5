//! Append-only run trace: `events.jsonl` + `steps.jsonl` grow one line
//! at a time during a run; `manifest.json` is written once at finalize.
//! [`schema::validate_trace_dir`] re-parses a written trace directory
//! against the three required shapes.

pub mod event;
pub mod manifest;
pub mod schema;
pub mod writer;

pub use event::{EventType, StepRecord, TraceEvent};
pub use manifest::{content_hash, Manifest, RunStatus, RunSummary};
pub use schema::validate_trace_dir;
pub use writer::TraceWriter;
