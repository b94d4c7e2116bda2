//! Hand-written spies that count how often action logic ran.

use async_trait::async_trait;
use cadence_core::{
    ActionContext, CoreError, Entity, Fact, ParameterSpec, Parameters, RuleAction, SimpleDecisionAction,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Boolean decision that answers with a fixed outcome and counts calls
#[derive(Debug, Clone)]
pub struct CountingDecision {
    name: String,
    subject: String,
    outcome: Result<bool, CoreError>,
    calls: Arc<AtomicUsize>,
}

impl CountingDecision {
    /// Decision reading `subject` that always answers `outcome`
    pub fn new(name: &str, subject: &str, outcome: Result<bool, CoreError>) -> Self {
        Self {
            name: name.to_string(),
            subject: subject.to_string(),
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, still readable after the spy moved into an executor
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimpleDecisionAction for CountingDecision {
    fn name(&self) -> &str {
        &self.name
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    async fn decide(&self, _subject: &Entity, _ctx: &dyn ActionContext) -> Result<bool, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Rule action that emits fixed facts and counts calls
#[derive(Debug, Clone)]
pub struct CountingRule {
    name: String,
    specs: Vec<ParameterSpec>,
    facts: Vec<Fact>,
    calls: Arc<AtomicUsize>,
}

impl CountingRule {
    /// Rule declaring `specs` and emitting `facts` when applied
    pub fn new(name: &str, specs: Vec<ParameterSpec>, facts: Vec<Fact>) -> Self {
        Self {
            name: name.to_string(),
            specs,
            facts,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleAction for CountingRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        self.specs.clone()
    }

    async fn apply(&self, _params: &Parameters, _ctx: &dyn ActionContext) -> Result<Vec<Fact>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.facts.clone())
    }
}
