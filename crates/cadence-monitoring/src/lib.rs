//! Monitoring for the Cadence action core.
//!
//! Provides tracing subscriber initialisation and an
//! [`ExecutionObserver`](cadence_core::ExecutionObserver) that forwards
//! execution outcomes to the `metrics` facade.

use cadence_core::{ExecutionObserver, LoggingConfig, NoopObserver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod logging;
pub mod metrics;

pub use crate::logging::{init_logging, init_test_tracing};
pub use crate::metrics::MetricsObserver;

/// Errors raised while setting up monitoring
#[derive(Error, Debug)]
pub enum MonitoringError {
    /// The log filter directive could not be parsed
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },
}

/// Configuration for initializing the monitoring system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,cadence::job=debug")
    pub log_filter: String,
    /// Emit JSON lines instead of pretty output
    pub enable_json_logging: bool,
    /// Forward execution outcomes to the metrics facade
    pub enable_metrics: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "cadence".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
            enable_metrics: true,
        }
    }
}

impl From<&LoggingConfig> for MonitoringConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            log_filter: logging.filter.clone(),
            enable_json_logging: logging.json,
            ..Default::default()
        }
    }
}

/// Observer to hand to executors, adapters and job runners
pub fn execution_observer(config: &MonitoringConfig) -> Arc<dyn ExecutionObserver> {
    if config.enable_metrics {
        Arc::new(MetricsObserver::new())
    } else {
        Arc::new(NoopObserver)
    }
}
