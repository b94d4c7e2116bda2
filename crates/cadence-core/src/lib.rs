//!
//! Cadence Core - action execution and abortable job runtime
//!
//! Small units of logic invoked by an external orchestrator: decision actions
//! in a workflow, long-running batch jobs and rule-triggered actions. Every
//! execution entry point is total. Failures are folded into a transition, a
//! job status or a rejected rule result and never reach the caller as an
//! error or a panic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading
pub mod config;

/// Per-invocation context handed in by the orchestrator
pub mod context;

/// Error types
pub mod error;

/// Decision actions and their executor
pub mod executor;

/// Abortable batch jobs
pub mod job;

/// Outcome hook for metrics and auditing
pub mod observer;

/// Transitions and job statuses
pub mod outcome;

/// Named action registration
pub mod registry;

/// Rule actions and their adapter
pub mod rule;

/// Entities and facts
pub mod types;

/// Log target for missing or invalid input
pub const DATA_TARGET: &str = "cadence::data";

/// Log target for failures inside action logic
pub const LOGIC_TARGET: &str = "cadence::logic";

/// Log target for batch job progress and item failures
pub const JOB_TARGET: &str = "cadence::job";

pub use config::{CadenceConfig, JobRunnerConfig, LoggingConfig};
pub use context::{typed_parameter, ActionContext, MapContext};
pub use error::{CoreError, ErrorCategory};
pub use executor::{ActionExecutor, BinaryDecision, DecisionAction, SimpleDecisionAction};
pub use job::{AbortFlag, AbortSignal, BatchJob, ItemFailure, JobRun, JobRunner, NeverAbort, WorkItem};
pub use observer::{ExecutionObserver, NoopObserver};
pub use outcome::{CompletionResult, JobStatus, PerformResult, RunState, Transition};
pub use registry::ActionRegistry;
pub use rule::{
    Constraint, ParamKind, ParamValue, ParameterSpec, Parameters, RuleAction, RuleActionAdapter,
    RuleActionResult,
};
pub use types::{Entity, EntityId, Fact};
