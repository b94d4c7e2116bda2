//! Testing utilities for the Cadence action core.
//!
//! Mocks of the action traits, call-counting spies, scripted work-item
//! sources, a recording observer and context builders.

pub mod builders;
pub mod mocks;
pub mod observer;
pub mod sources;
pub mod spies;

/// Re-export commonly used types for convenience
pub use mockall;

pub use builders::{order_context, order_entity};
pub use cadence_monitoring::init_test_tracing;
pub use observer::{ObservedEvent, RecordingObserver};
pub use sources::{failing_source, numbered_items, AbortAfterChecks, ScriptedProcessor};
pub use spies::{CountingDecision, CountingRule};
