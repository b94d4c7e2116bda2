//! Hook through which components report outcomes to whatever metrics or
//! audit backend the host wires in.

use crate::error::ErrorCategory;
use crate::job::JobRun;
use crate::outcome::Transition;

/// Receives one callback per outcome. All methods default to no-ops, and
/// implementations must not panic or block for long: they run inline on the
/// orchestrator's call.
pub trait ExecutionObserver: Send + Sync {
    /// A decision action produced a transition
    fn on_transition(&self, _action: &str, _transition: &Transition) {}

    /// A failure was contained at a component boundary
    fn on_contained_failure(&self, _component: &str, _category: ErrorCategory) {}

    /// A rule action finished
    fn on_rule_result(&self, _action: &str, _applied: bool, _facts: usize) {}

    /// A batch job run reached its terminal status
    fn on_job_finished(&self, _run: &JobRun) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}
