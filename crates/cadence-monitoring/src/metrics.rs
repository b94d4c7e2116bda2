//! Execution metrics on top of the `metrics` facade.
//!
//! Nothing is exported unless the host installs a recorder (e.g. a
//! Prometheus exporter); without one every call is a no-op.

use cadence_core::{ErrorCategory, ExecutionObserver, JobRun, Transition};
use ::metrics::{counter, histogram};

/// Decision outcomes, labelled by action and transition
pub const TRANSITIONS_TOTAL: &str = "cadence_action_transitions_total";
/// Failures contained at a component boundary, labelled by component and category
pub const CONTAINED_FAILURES_TOTAL: &str = "cadence_contained_failures_total";
/// Rule action results, labelled by action and applied flag
pub const RULE_RESULTS_TOTAL: &str = "cadence_rule_results_total";
/// Facts returned by applied rule actions
pub const RULE_FACTS_TOTAL: &str = "cadence_rule_facts_total";
/// Finished job runs, labelled by job and status
pub const JOB_RUNS_TOTAL: &str = "cadence_job_runs_total";
/// Per-item failures across job runs
pub const JOB_ITEM_FAILURES_TOTAL: &str = "cadence_job_item_failures_total";
/// Items attempted per job run
pub const JOB_ITEMS_PROCESSED: &str = "cadence_job_items_processed";

/// Observer that turns execution outcomes into counters and histograms
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl MetricsObserver {
    /// Create a new observer
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionObserver for MetricsObserver {
    fn on_transition(&self, action: &str, transition: &Transition) {
        counter!(
            TRANSITIONS_TOTAL,
            1,
            "action" => action.to_string(),
            "transition" => transition.label().to_string()
        );
    }

    fn on_contained_failure(&self, component: &str, category: ErrorCategory) {
        counter!(
            CONTAINED_FAILURES_TOTAL,
            1,
            "component" => component.to_string(),
            "category" => category.as_str()
        );
    }

    fn on_rule_result(&self, action: &str, applied: bool, facts: usize) {
        counter!(
            RULE_RESULTS_TOTAL,
            1,
            "action" => action.to_string(),
            "applied" => if applied { "true" } else { "false" }
        );
        if facts > 0 {
            counter!(RULE_FACTS_TOTAL, facts as u64, "action" => action.to_string());
        }
    }

    fn on_job_finished(&self, run: &JobRun) {
        let status = run.status().map(|s| s.as_str()).unwrap_or("UNKNOWN");
        counter!(
            JOB_RUNS_TOTAL,
            1,
            "job" => run.job().to_string(),
            "status" => status
        );
        if run.failed() > 0 {
            counter!(JOB_ITEM_FAILURES_TOTAL, run.failed(), "job" => run.job().to_string());
        }
        histogram!(
            JOB_ITEMS_PROCESSED,
            run.processed() as f64,
            "job" => run.job().to_string()
        );
    }
}
