//! Configuration for the Cadence core
//!
//! Values come from built-in defaults, then an optional YAML file, then
//! `CADENCE_*` environment variables.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::CoreError;

/// Upper bound for `job.failure_sample_limit`
pub const MAX_FAILURE_SAMPLE_LIMIT: usize = 10_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Job runner settings
    #[serde(default)]
    pub job: JobRunnerConfig,

    /// Per-action settings, keyed by registered action name
    #[serde(default)]
    pub actions: HashMap<String, serde_json::Value>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive (e.g., "info,cadence::job=debug")
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

/// Job runner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRunnerConfig {
    /// Log a progress line every N processed items; 0 disables it
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// How many per-item failures a run keeps for inspection
    #[serde(default = "default_failure_sample_limit")]
    pub failure_sample_limit: usize,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            failure_sample_limit: default_failure_sample_limit(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_progress_interval() -> u64 {
    1000
}

fn default_failure_sample_limit() -> usize {
    100
}

impl CadenceConfig {
    /// Load configuration from an optional YAML file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let raw = std::fs::read_to_string(path)?;
                Self::from_yaml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Override values from `CADENCE_*` variables returned by `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup("CADENCE_LOG_FILTER") {
            self.logging.filter = filter;
        }

        if let Some(json) = lookup("CADENCE_JSON_LOGS") {
            self.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
        }

        if let Some(interval) = lookup("CADENCE_JOB_PROGRESS_INTERVAL") {
            if let Ok(interval) = interval.parse::<u64>() {
                self.job.progress_interval = interval;
            } else {
                warn!("Invalid CADENCE_JOB_PROGRESS_INTERVAL value: {}", interval);
            }
        }

        if let Some(limit) = lookup("CADENCE_JOB_FAILURE_SAMPLE_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.job.failure_sample_limit = limit;
            } else {
                warn!("Invalid CADENCE_JOB_FAILURE_SAMPLE_LIMIT value: {}", limit);
            }
        }
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.logging.filter.trim().is_empty() {
            return Err(CoreError::Configuration(
                "logging.filter must not be empty".to_string(),
            ));
        }

        if self.job.failure_sample_limit > MAX_FAILURE_SAMPLE_LIMIT {
            return Err(CoreError::Configuration(format!(
                "job.failure_sample_limit must be at most {}",
                MAX_FAILURE_SAMPLE_LIMIT
            )));
        }

        Ok(())
    }

    /// Settings for one action, or `T::default()` when none are configured
    pub fn action_settings<T>(&self, action: &str) -> Result<T, CoreError>
    where
        T: DeserializeOwned + Default,
    {
        match self.actions.get(action) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                CoreError::Configuration(format!("invalid settings for action '{}': {}", action, e))
            }),
            None => Ok(T::default()),
        }
    }
}
