//! Decision actions and the executor that runs them.
//!
//! An executor turns one invocation into exactly one [`Transition`]. Missing
//! subjects, returned errors, panics and undeclared transitions all become
//! `NOK`; nothing propagates to the orchestrator.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::context::ActionContext;
use crate::error::{CoreError, ErrorCategory};
use crate::observer::{ExecutionObserver, NoopObserver};
use crate::outcome::Transition;
use crate::types::Entity;
use crate::{DATA_TARGET, LOGIC_TARGET};

/// Entity name decision actions read unless they say otherwise
pub const DEFAULT_SUBJECT: &str = "subject";

/// Decision action that may choose among more than two transitions.
#[async_trait]
pub trait DecisionAction: Send + Sync {
    /// Registered name, used in logs and metrics
    fn name(&self) -> &str;

    /// Name of the context entity this action decides about
    fn subject(&self) -> &str {
        DEFAULT_SUBJECT
    }

    /// Every transition this action may return. `OK` and `NOK` are always
    /// accepted even if omitted here.
    fn transitions(&self) -> Vec<Transition> {
        vec![Transition::Ok, Transition::Nok]
    }

    /// Decide which path the orchestrator takes next
    async fn decide(&self, subject: &Entity, ctx: &dyn ActionContext)
        -> Result<Transition, CoreError>;
}

/// Decision action with a plain success/failure outcome.
#[async_trait]
pub trait SimpleDecisionAction: Send + Sync {
    /// Registered name, used in logs and metrics
    fn name(&self) -> &str;

    /// Name of the context entity this action decides about
    fn subject(&self) -> &str {
        DEFAULT_SUBJECT
    }

    /// `true` routes to `OK`, `false` to `NOK`
    async fn decide(&self, subject: &Entity, ctx: &dyn ActionContext) -> Result<bool, CoreError>;
}

/// Adapts a [`SimpleDecisionAction`] to the [`DecisionAction`] interface
#[derive(Debug)]
pub struct BinaryDecision<A>(pub A);

#[async_trait]
impl<A> DecisionAction for BinaryDecision<A>
where
    A: SimpleDecisionAction,
{
    fn name(&self) -> &str {
        self.0.name()
    }

    fn subject(&self) -> &str {
        self.0.subject()
    }

    async fn decide(
        &self,
        subject: &Entity,
        ctx: &dyn ActionContext,
    ) -> Result<Transition, CoreError> {
        let success = self.0.decide(subject, ctx).await?;
        Ok(Transition::from_success(success))
    }
}

/// Runs one decision action per call and always yields a transition.
pub struct ActionExecutor {
    action: Arc<dyn DecisionAction>,
    transitions: Vec<Transition>,
    observer: Arc<dyn ExecutionObserver>,
}

impl ActionExecutor {
    /// Create an executor for a multi-outcome action
    pub fn new(action: Arc<dyn DecisionAction>) -> Self {
        let mut transitions = action.transitions();
        for reserved in [Transition::Ok, Transition::Nok] {
            if !transitions.contains(&reserved) {
                transitions.push(reserved);
            }
        }

        Self {
            action,
            transitions,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Create an executor for a boolean action
    pub fn simple<A>(action: A) -> Self
    where
        A: SimpleDecisionAction + 'static,
    {
        Self::new(Arc::new(BinaryDecision(action)))
    }

    /// Report outcomes to the given observer
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Name of the wrapped action
    pub fn action_name(&self) -> &str {
        self.action.name()
    }

    /// The transitions this executor can return
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Execute the action against a context.
    pub async fn execute(&self, ctx: &dyn ActionContext) -> Transition {
        let action = self.action.name();
        let subject_name = self.action.subject();

        let Some(subject) = ctx.entity(subject_name) else {
            warn!(
                target: DATA_TARGET,
                action = %action,
                invocation = %ctx.invocation_id(),
                subject = %subject_name,
                "Missing entity, decision skipped"
            );
            self.observer
                .on_contained_failure(action, ErrorCategory::Input);
            return self.finish(Transition::Nok);
        };

        debug!(
            action = %action,
            invocation = %ctx.invocation_id(),
            entity = %subject.id,
            "Executing decision"
        );

        let outcome = AssertUnwindSafe(self.action.decide(subject, ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(CoreError::from_panic(payload)))
            .and_then(|transition| self.check_declared(transition));

        let transition = match outcome {
            Ok(transition) => {
                if transition == Transition::Nok {
                    warn!(
                        action = %action,
                        invocation = %ctx.invocation_id(),
                        entity = %subject.id,
                        "Decision rejected"
                    );
                } else {
                    info!(
                        action = %action,
                        invocation = %ctx.invocation_id(),
                        entity = %subject.id,
                        transition = %transition,
                        "Decision completed"
                    );
                }
                transition
            }
            Err(e) => {
                error!(
                    target: LOGIC_TARGET,
                    action = %action,
                    invocation = %ctx.invocation_id(),
                    entity = %subject.id,
                    error = %e,
                    "Decision failed, routing to NOK"
                );
                self.observer.on_contained_failure(action, e.category());
                Transition::Nok
            }
        };

        self.finish(transition)
    }

    fn check_declared(&self, transition: Transition) -> Result<Transition, CoreError> {
        if self.transitions.contains(&transition) {
            Ok(transition)
        } else {
            Err(CoreError::UndeclaredTransition {
                action: self.action.name().to_string(),
                transition: transition.to_string(),
            })
        }
    }

    fn finish(&self, transition: Transition) -> Transition {
        self.observer.on_transition(self.action.name(), &transition);
        transition
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("action", &self.action.name())
            .field("transitions", &self.transitions)
            .finish()
    }
}
