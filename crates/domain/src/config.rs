use serde::{Deserialize, Serialize};

/// Severity of a [`ConfigError`] — a `Warning` is reported but does not
/// block startup; an `Error` should.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

impl std::fmt::Display for ConfigSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSeverity::Warning => write!(f, "warning"),
            ConfigSeverity::Error => write!(f, "error"),
        }
    }
}

/// One problem found while validating a [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self { severity: ConfigSeverity::Error, field: field.into(), message: message.into() }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self { severity: ConfigSeverity::Warning, field: field.into(), message: message.into() }
    }
}

/// Engine defaults applied when a [`crate::task::Task`] doesn't carry its
/// own budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_max_steps: u32,
    pub default_max_runtime_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { default_max_steps: 25, default_max_runtime_seconds: 600 }
    }
}

/// Which memory strategy to build by default, and its tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStrategyKind {
    Window,
    Summary,
    Vector,
    Conversation,
}

impl Default for MemoryStrategyKind {
    fn default() -> Self {
        MemoryStrategyKind::Window
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub strategy: MemoryStrategyKind,
    pub window_size: usize,
    pub summary_keep_last: usize,
    pub vector_top_k: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { strategy: MemoryStrategyKind::default(), window_size: 20, summary_keep_last: 10, vector_top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub worker_pool_size: usize,
    pub resume: bool,
    pub output_path: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { worker_pool_size: 4, resume: false, output_path: "runs/output.jsonl".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub output_dir: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self { output_dir: "runs/traces".into() }
    }
}

/// Aggregate runtime configuration. Every field has a sensible default,
/// so a missing config file is not an error — `RuntimeConfig::default()`
/// is itself a fully valid runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub memory: MemoryConfig,
    pub batch: BatchConfig,
    pub trace: TraceConfig,
}

impl RuntimeConfig {
    pub fn from_toml_str(raw: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from the path named by `AGENTRT_CONFIG`, falling back to
    /// `runtime.toml`, falling back to built-in defaults if neither
    /// exists.
    pub fn load_or_default() -> crate::error::Result<Self> {
        let path = std::env::var("AGENTRT_CONFIG").unwrap_or_else(|_| "runtime.toml".into());
        if std::path::Path::new(&path).exists() {
            tracing::info!(path = %path, "loading runtime config");
            let raw = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&raw)
        } else {
            tracing::debug!(path = %path, "no config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        if self.engine.default_max_steps == 0 {
            issues.push(ConfigError::error("engine.default_max_steps", "must be positive"));
        }
        if self.engine.default_max_runtime_seconds == 0 {
            issues.push(ConfigError::warning(
                "engine.default_max_runtime_seconds",
                "zero disables the runtime budget entirely",
            ));
        }

        if self.memory.strategy == MemoryStrategyKind::Window && self.memory.window_size == 0 {
            issues.push(ConfigError::error("memory.window_size", "must be positive for the window strategy"));
        }
        if self.memory.strategy == MemoryStrategyKind::Summary && self.memory.summary_keep_last == 0 {
            issues.push(ConfigError::error("memory.summary_keep_last", "must be positive for the summary strategy"));
        }
        if self.memory.strategy == MemoryStrategyKind::Vector && self.memory.vector_top_k == 0 {
            issues.push(ConfigError::error("memory.vector_top_k", "must be positive for the vector strategy"));
        }

        if self.batch.worker_pool_size == 0 {
            issues.push(ConfigError::error("batch.worker_pool_size", "must be at least 1"));
        }
        if self.batch.output_path.trim().is_empty() {
            issues.push(ConfigError::error("batch.output_path", "must not be empty"));
        }

        if self.trace.output_dir.trim().is_empty() {
            issues.push(ConfigError::error("trace.output_dir", "must not be empty"));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    fn find_issue<'a>(issues: &'a [ConfigError], field: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|i| i.field == field)
    }

    #[test]
    fn default_config_is_valid() {
        assert!(valid_config().validate().is_empty());
    }

    #[test]
    fn zero_max_steps_is_an_error() {
        let mut config = valid_config();
        config.engine.default_max_steps = 0;
        let issues = config.validate();
        let issue = find_issue(&issues, "engine.default_max_steps").unwrap();
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn zero_runtime_budget_is_a_warning_not_an_error() {
        let mut config = valid_config();
        config.engine.default_max_runtime_seconds = 0;
        let issues = config.validate();
        let issue = find_issue(&issues, "engine.default_max_runtime_seconds").unwrap();
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn window_strategy_requires_positive_window_size() {
        let mut config = valid_config();
        config.memory.strategy = MemoryStrategyKind::Window;
        config.memory.window_size = 0;
        assert!(find_issue(&config.validate(), "memory.window_size").is_some());
    }

    #[test]
    fn vector_strategy_with_zero_window_size_is_fine() {
        let mut config = valid_config();
        config.memory.strategy = MemoryStrategyKind::Vector;
        config.memory.window_size = 0;
        assert!(find_issue(&config.validate(), "memory.window_size").is_none());
    }

    #[test]
    fn zero_worker_pool_is_an_error() {
        let mut config = valid_config();
        config.batch.worker_pool_size = 0;
        assert!(find_issue(&config.validate(), "batch.worker_pool_size").is_some());
    }

    #[test]
    fn display_format_matches_bracketed_convention() {
        let err = ConfigError::error("a.b", "bad value");
        assert_eq!(err.to_string(), "[error] a.b: bad value");
    }

    #[test]
    fn from_toml_str_parses_partial_overrides() {
        let config = RuntimeConfig::from_toml_str("[batch]\nworker_pool_size = 8\n").unwrap();
        assert_eq!(config.batch.worker_pool_size, 8);
        assert_eq!(config.engine.default_max_steps, 25);
    }
}
