pub mod action_result;
pub mod config;
pub mod decision;
pub mod error;
pub mod message;
pub mod mutation_log;
pub mod state;
pub mod task;
pub mod trajectory;

pub use action_result::{ActionResult, ActionStatus};
pub use decision::{Decision, ToolCall};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use mutation_log::{MutationLog, MutationRecord};
pub use state::{winning_stop_reason, State, StopReason};
pub use task::{validate_task, EnvSpec, ResourceKind, Task, TaskBudget, TaskResource, TaskValidationIssue};
pub use trajectory::{TrajectoryEntry, TrajectoryRole};
