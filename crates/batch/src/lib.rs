//! Batch benchmark runner: executes N tasks with bounded concurrency,
//! per-task isolation, idempotent resumption, and aggregated metrics.
//! [`runner::BatchRunner`] owns the worker pool and drives one
//! [`agentrt_engine::Engine`] per job via [`runner::JobFactories`];
//! [`adapter::BenchmarkAdapter`] is the seam to a benchmark's own
//! storage format.

pub mod adapter;
pub mod concurrency;
pub mod error;
pub mod output;
pub mod row;
pub mod runner;
pub mod work;

pub use adapter::{BenchmarkAdapter, InMemoryAdapter};
pub use concurrency::ConcurrencyGuard;
pub use error::{BatchError, Result};
pub use output::OutputWriter;
pub use row::BatchRow;
pub use runner::{BatchOutcome, BatchRunner, JobFactories};
pub use work::{build_work_list, filter_resumed, WorkItem};
