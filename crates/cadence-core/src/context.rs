//! The per-invocation handle an orchestrator passes to an action.
//!
//! The core only ever reads through [`ActionContext`]; it never mutates
//! orchestrator state and never keeps a context past the call it was given to.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::CoreError;
use crate::job::AbortSignal;
use crate::types::Entity;

/// Capabilities an orchestrator exposes to one action invocation.
pub trait ActionContext: Send + Sync {
    /// Identifier of the process or job instance this invocation belongs to
    fn invocation_id(&self) -> &str;

    /// Read a named entity, e.g. the workflow subject
    fn entity(&self, name: &str) -> Option<&Entity>;

    /// Read a raw parameter value
    fn parameter(&self, name: &str) -> Option<&serde_json::Value>;

    /// Whether the orchestrator asked for this invocation to stop early
    fn abort_requested(&self) -> bool {
        false
    }
}

/// Read a parameter and deserialize it into `T`.
///
/// An absent or `null` parameter is `MissingParameter`; a value that does not
/// deserialize into `T` is `InvalidParameter`.
pub fn typed_parameter<T>(ctx: &dyn ActionContext, name: &str) -> Result<T, CoreError>
where
    T: DeserializeOwned,
{
    match ctx.parameter(name) {
        None | Some(serde_json::Value::Null) => Err(CoreError::MissingParameter(name.to_string())),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| CoreError::invalid_parameter(name, format!("{} (got {})", e, value))),
    }
}

/// Plain in-memory [`ActionContext`] for hosts that already hold their data
/// as JSON, and for tests.
#[derive(Default, Clone)]
pub struct MapContext {
    invocation_id: String,
    entities: HashMap<String, Entity>,
    parameters: HashMap<String, serde_json::Value>,
    abort: Option<Arc<dyn AbortSignal>>,
}

impl MapContext {
    /// Create an empty context for the given invocation
    pub fn new(invocation_id: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            ..Default::default()
        }
    }

    /// Attach an entity under a name
    pub fn with_entity(mut self, name: &str, entity: Entity) -> Self {
        self.entities.insert(name.to_string(), entity);
        self
    }

    /// Attach a parameter
    pub fn with_parameter(mut self, name: &str, value: serde_json::Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Back `abort_requested` with an abort signal
    pub fn with_abort_signal(mut self, signal: Arc<dyn AbortSignal>) -> Self {
        self.abort = Some(signal);
        self
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext")
            .field("invocation_id", &self.invocation_id)
            .field("entities", &self.entities)
            .field("parameters", &self.parameters)
            .field("abortable", &self.abort.is_some())
            .finish()
    }
}

impl ActionContext for MapContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    fn parameter(&self, name: &str) -> Option<&serde_json::Value> {
        self.parameters.get(name)
    }

    fn abort_requested(&self) -> bool {
        self.abort
            .as_ref()
            .map(|signal| signal.abort_requested())
            .unwrap_or(false)
    }
}
