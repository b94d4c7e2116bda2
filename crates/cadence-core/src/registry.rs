//! Named registration of actions and jobs.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::CoreError;
use crate::executor::{ActionExecutor, BinaryDecision, DecisionAction, SimpleDecisionAction};
use crate::job::BatchJob;
use crate::observer::{ExecutionObserver, NoopObserver};
use crate::rule::{RuleAction, RuleActionAdapter};

/// Registry mapping action names to their implementations.
///
/// Registration replaces any earlier entry with the same name. Components
/// built from the registry share the registry's observer.
pub struct ActionRegistry {
    decisions: DashMap<String, Arc<dyn DecisionAction>>,
    rules: DashMap<String, Arc<dyn RuleAction>>,
    jobs: DashMap<String, Arc<dyn BatchJob>>,
    observer: Arc<dyn ExecutionObserver>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            decisions: DashMap::new(),
            rules: DashMap::new(),
            jobs: DashMap::new(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach the observer handed to every component built from this registry
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register a multi-outcome decision action under its own name
    pub fn register_decision(&self, action: Arc<dyn DecisionAction>) {
        let name = action.name().to_string();
        debug!(action = %name, "Registering decision action");
        self.decisions.insert(name, action);
    }

    /// Register a boolean decision action under its own name
    pub fn register_simple_decision<A>(&self, action: A)
    where
        A: SimpleDecisionAction + 'static,
    {
        self.register_decision(Arc::new(BinaryDecision(action)));
    }

    /// Register a rule action under its own name
    pub fn register_rule(&self, action: Arc<dyn RuleAction>) {
        let name = action.name().to_string();
        debug!(action = %name, "Registering rule action");
        self.rules.insert(name, action);
    }

    /// Register a batch job under its own name
    pub fn register_job(&self, job: Arc<dyn BatchJob>) {
        let name = job.name().to_string();
        debug!(job = %name, "Registering batch job");
        self.jobs.insert(name, job);
    }

    /// Build an executor for the named decision action
    pub fn decision_executor(&self, name: &str) -> Result<ActionExecutor, CoreError> {
        let action = self
            .decisions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoreError::UnknownAction(name.to_string()))?;

        Ok(ActionExecutor::new(action).with_observer(self.observer.clone()))
    }

    /// Build an adapter for the named rule action
    pub fn rule_adapter(&self, name: &str) -> Result<RuleActionAdapter, CoreError> {
        let action = self
            .rules
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoreError::UnknownAction(name.to_string()))?;

        Ok(RuleActionAdapter::new(action).with_observer(self.observer.clone()))
    }

    /// Look up the named batch job
    pub fn job(&self, name: &str) -> Result<Arc<dyn BatchJob>, CoreError> {
        self.jobs
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CoreError::UnknownAction(name.to_string()))
    }

    /// Names of all registered decision actions, sorted
    pub fn decision_names(&self) -> Vec<String> {
        sorted_keys(&self.decisions)
    }

    /// Names of all registered rule actions, sorted
    pub fn rule_names(&self) -> Vec<String> {
        sorted_keys(&self.rules)
    }

    /// Names of all registered batch jobs, sorted
    pub fn job_names(&self) -> Vec<String> {
        sorted_keys(&self.jobs)
    }
}

fn sorted_keys<V>(map: &DashMap<String, V>) -> Vec<String> {
    let mut names: Vec<String> = map.iter().map(|entry| entry.key().clone()).collect();
    names.sort();
    names
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("decisions", &self.decision_names())
            .field("rules", &self.rule_names())
            .field("jobs", &self.job_names())
            .finish()
    }
}
