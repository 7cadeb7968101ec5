use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of an external resource a task depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    File,
    Dir,
    Url,
    Artifact,
}

/// A single resource reference a task needs, by path or URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResource {
    pub kind: ResourceKind,
    /// A filesystem path (for `file`/`dir`/`artifact`) or a URI (for `url`).
    pub locator: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Resource consumption caps for one run. Any field left unset is
/// unbounded for that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBudget {
    pub max_steps: Option<u32>,
    pub max_runtime_seconds: Option<u64>,
    pub max_tokens: Option<u64>,
}

/// The capability surface a task expects its environment to provide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvSpec {
    #[serde(rename = "type", default)]
    pub env_type: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Immutable description of one unit of work for the engine to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub objective: String,
    #[serde(default)]
    pub inputs: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub resources: Vec<TaskResource>,
    #[serde(default)]
    pub env_spec: EnvSpec,
    #[serde(default)]
    pub budget: Option<TaskBudget>,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Task {
    pub fn new(id: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            objective: objective.into(),
            inputs: HashMap::new(),
            resources: Vec::new(),
            env_spec: EnvSpec::default(),
            budget: None,
            success_criteria: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

/// A single structural problem found on a [`Task`], named the same way
/// downstream tooling keyed on its `code` already expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskValidationIssue {
    pub code: String,
    pub field: String,
    pub message: String,
}

impl TaskValidationIssue {
    fn new(code: &str, field: &str, message: impl Into<String>) -> Self {
        Self { code: code.into(), field: field.into(), message: message.into() }
    }
}

/// Validate a [`Task`]'s structure. `workspace_root`, when given, enables
/// the resource existence/writability checks that need a filesystem to
/// resolve relative paths against.
pub fn validate_task(task: &Task, workspace_root: Option<&std::path::Path>) -> Vec<TaskValidationIssue> {
    let mut issues = Vec::new();

    if task.id.trim().is_empty() {
        issues.push(TaskValidationIssue::new("TASK_ID_INVALID", "id", "task id must not be empty"));
    }
    if task.objective.trim().is_empty() {
        issues.push(TaskValidationIssue::new(
            "TASK_OBJECTIVE_INVALID",
            "objective",
            "task objective must not be empty",
        ));
    }

    if let Some(budget) = &task.budget {
        if let Some(steps) = budget.max_steps {
            if steps == 0 {
                issues.push(TaskValidationIssue::new(
                    "TASK_BUDGET_STEPS_INVALID",
                    "budget.max_steps",
                    "max_steps must be positive",
                ));
            }
        }
        if let Some(secs) = budget.max_runtime_seconds {
            if secs == 0 {
                issues.push(TaskValidationIssue::new(
                    "TASK_BUDGET_RUNTIME_INVALID",
                    "budget.max_runtime_seconds",
                    "max_runtime_seconds must be positive",
                ));
            }
        }
        if let Some(tokens) = budget.max_tokens {
            if tokens == 0 {
                issues.push(TaskValidationIssue::new(
                    "TASK_BUDGET_TOKENS_INVALID",
                    "budget.max_tokens",
                    "max_tokens must be positive",
                ));
            }
        }
    }

    if let Some(env_type) = &task.env_spec.env_type {
        if env_type.trim().is_empty() {
            issues.push(TaskValidationIssue::new(
                "TASK_ENV_SPEC_INVALID",
                "env_spec.type",
                "env_spec.type must not be empty when present",
            ));
        }
    }

    for (idx, resource) in task.resources.iter().enumerate() {
        let field = format!("resources[{idx}]");
        let locator = match &resource.locator {
            Some(l) if !l.trim().is_empty() => l,
            _ => {
                issues.push(TaskValidationIssue::new(
                    "TASK_RESOURCE_LOCATOR_MISSING",
                    &field,
                    "resource must carry a non-empty path or uri",
                ));
                continue;
            }
        };

        if resource.kind == ResourceKind::Url {
            continue;
        }

        let Some(root) = workspace_root else { continue };
        let resolved = root.join(locator);
        if resolved.exists() {
            if !is_writable(&resolved) {
                issues.push(TaskValidationIssue::new(
                    "TASK_RESOURCE_NOT_WRITABLE",
                    &field,
                    format!("resource at {} is not writable", resolved.display()),
                ));
            }
        } else if resource.required {
            let parent_writable = resolved.parent().map(is_writable).unwrap_or(false);
            if parent_writable {
                issues.push(TaskValidationIssue::new(
                    "TASK_RESOURCE_MISSING",
                    &field,
                    format!("required resource at {} does not exist", resolved.display()),
                ));
            } else {
                issues.push(TaskValidationIssue::new(
                    "TASK_RESOURCE_PARENT_NOT_WRITABLE",
                    &field,
                    format!(
                        "required resource at {} is missing and its parent directory is not writable",
                        resolved.display()
                    ),
                ));
            }
        }
    }

    issues
}

#[cfg(unix)]
fn is_writable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o222 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_writable(path: &std::path::Path) -> bool {
    std::fs::metadata(path).map(|m| !m.permissions().readonly()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(issues: &'a [TaskValidationIssue], code: &str) -> Option<&'a TaskValidationIssue> {
        issues.iter().find(|i| i.code == code)
    }

    #[test]
    fn valid_task_has_no_issues() {
        let task = Task::new("t1", "do the thing");
        assert!(validate_task(&task, None).is_empty());
    }

    #[test]
    fn empty_id_and_objective_are_flagged() {
        let task = Task::new("", "");
        let issues = validate_task(&task, None);
        assert!(find(&issues, "TASK_ID_INVALID").is_some());
        assert!(find(&issues, "TASK_OBJECTIVE_INVALID").is_some());
    }

    #[test]
    fn zero_budget_values_are_rejected() {
        let mut task = Task::new("t1", "obj");
        task.budget = Some(TaskBudget { max_steps: Some(0), max_runtime_seconds: Some(0), max_tokens: Some(0) });
        let issues = validate_task(&task, None);
        assert!(find(&issues, "TASK_BUDGET_STEPS_INVALID").is_some());
        assert!(find(&issues, "TASK_BUDGET_RUNTIME_INVALID").is_some());
        assert!(find(&issues, "TASK_BUDGET_TOKENS_INVALID").is_some());
    }

    #[test]
    fn resource_missing_locator_is_flagged() {
        let mut task = Task::new("t1", "obj");
        task.resources.push(TaskResource { kind: ResourceKind::File, locator: None, required: true });
        let issues = validate_task(&task, None);
        assert!(find(&issues, "TASK_RESOURCE_LOCATOR_MISSING").is_some());
    }

    #[test]
    fn required_missing_resource_is_flagged_when_workspace_given() {
        let dir = tempdir();
        let mut task = Task::new("t1", "obj");
        task.resources.push(TaskResource {
            kind: ResourceKind::File,
            locator: Some("missing.txt".into()),
            required: true,
        });
        let issues = validate_task(&task, Some(dir.path()));
        assert!(issues.iter().any(|i| i.code.contains("RESOURCE")));
    }

    #[test]
    fn url_resources_skip_filesystem_checks() {
        let mut task = Task::new("t1", "obj");
        task.resources.push(TaskResource {
            kind: ResourceKind::Url,
            locator: Some("https://example.com".into()),
            required: true,
        });
        assert!(validate_task(&task, None).is_empty());
    }

    fn tempdir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }
}
