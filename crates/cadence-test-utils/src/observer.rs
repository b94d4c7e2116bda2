//! Observer that records every callback for later assertions.

use cadence_core::{ErrorCategory, ExecutionObserver, JobRun, JobStatus, Transition};
use parking_lot::Mutex;

/// One observed callback
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    /// `on_transition`
    Transition {
        /// Action name
        action: String,
        /// Returned transition
        transition: Transition,
    },
    /// `on_contained_failure`
    ContainedFailure {
        /// Component name
        component: String,
        /// Failure category
        category: ErrorCategory,
    },
    /// `on_rule_result`
    RuleResult {
        /// Action name
        action: String,
        /// Whether it was applied
        applied: bool,
        /// Number of facts
        facts: usize,
    },
    /// `on_job_finished`
    JobFinished {
        /// Job name
        job: String,
        /// Terminal status
        status: Option<JobStatus>,
        /// Items attempted
        processed: u64,
        /// Items failed
        failed: u64,
    },
}

/// Records every callback in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().clone()
    }

    /// Transitions in arrival order
    pub fn transitions(&self) -> Vec<Transition> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Transition { transition, .. } => Some(transition.clone()),
                _ => None,
            })
            .collect()
    }

    /// Contained failure categories in arrival order
    pub fn failures(&self) -> Vec<ErrorCategory> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::ContainedFailure { category, .. } => Some(*category),
                _ => None,
            })
            .collect()
    }

    /// Terminal job statuses in arrival order
    pub fn job_statuses(&self) -> Vec<Option<JobStatus>> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::JobFinished { status, .. } => Some(*status),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().push(event);
    }
}

impl ExecutionObserver for RecordingObserver {
    fn on_transition(&self, action: &str, transition: &Transition) {
        self.push(ObservedEvent::Transition {
            action: action.to_string(),
            transition: transition.clone(),
        });
    }

    fn on_contained_failure(&self, component: &str, category: ErrorCategory) {
        self.push(ObservedEvent::ContainedFailure {
            component: component.to_string(),
            category,
        });
    }

    fn on_rule_result(&self, action: &str, applied: bool, facts: usize) {
        self.push(ObservedEvent::RuleResult {
            action: action.to_string(),
            applied,
            facts,
        });
    }

    fn on_job_finished(&self, run: &JobRun) {
        self.push(ObservedEvent::JobFinished {
            job: run.job().to_string(),
            status: run.status(),
            processed: run.processed(),
            failed: run.failed(),
        });
    }
}
