//! Batch jobs over in-memory entity lists.

use async_trait::async_trait;
use cadence_core::{BatchJob, CoreError, Entity};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;

type Processor = dyn Fn(&Entity) -> Result<(), CoreError> + Send + Sync;

/// A [`BatchJob`] over a fixed list of entities and a per-item processor.
///
/// Useful for hosts that already loaded their work set, and as the simplest
/// job to register next to database-backed ones.
pub struct EntityBatchJob {
    name: String,
    entities: Vec<Entity>,
    abortable: bool,
    processor: Box<Processor>,
}

impl EntityBatchJob {
    /// Create an abortable job
    pub fn new<F>(name: impl Into<String>, entities: Vec<Entity>, processor: F) -> Self
    where
        F: Fn(&Entity) -> Result<(), CoreError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            entities,
            abortable: true,
            processor: Box::new(processor),
        }
    }

    /// Ignore abort requests for this job
    pub fn non_abortable(mut self) -> Self {
        self.abortable = false;
        self
    }

    /// Number of queued entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the job has nothing to do
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl fmt::Debug for EntityBatchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBatchJob")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("abortable", &self.abortable)
            .finish()
    }
}

#[async_trait]
impl BatchJob for EntityBatchJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_abortable(&self) -> bool {
        self.abortable
    }

    fn items(&self) -> BoxStream<'_, Result<Entity, CoreError>> {
        stream::iter(self.entities.iter().cloned().map(Ok)).boxed()
    }

    async fn process(&self, item: Entity) -> Result<(), CoreError> {
        (self.processor)(&item)
    }
}
