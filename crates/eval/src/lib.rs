//! Scores finished runs and aggregates metrics across many of them.
//!
//! [`context::Evaluator`] is the shared interface for
//! [`rule_based::RuleBasedEvaluator`], [`dsl::DslEvaluator`], and
//! [`model_based::ModelBasedEvaluator`]; [`suite::EvaluationSuite`]
//! combines several under one pass/fail policy. [`metrics`] computes the
//! batch-wide report, including pass^k, over a collection of per-run rows.

pub mod context;
pub mod dsl;
pub mod metrics;
pub mod model_based;
pub mod rule_based;
pub mod suite;

pub use context::{EvaluationContext, EvaluationResult, Evaluator};
pub use dsl::DslEvaluator;
pub use metrics::{compute_report, MetricInput, MetricReport};
pub use model_based::ModelBasedEvaluator;
pub use rule_based::RuleBasedEvaluator;
pub use suite::{EvaluationSuite, SuiteMode, SuiteResult};
