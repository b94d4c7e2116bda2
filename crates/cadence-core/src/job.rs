//! Abortable batch jobs.
//!
//! [`JobRunner`] drives a lazily produced sequence of work items one at a
//! time. Each pulled item is checked against an [`AbortSignal`] before it is
//! processed. A failing item is counted and skipped. A failing item source or
//! abort check ends the run with `ERROR`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JobRunnerConfig;
use crate::error::CoreError;
use crate::observer::{ExecutionObserver, NoopObserver};
use crate::outcome::{JobStatus, PerformResult};
use crate::types::{Entity, EntityId};
use crate::JOB_TARGET;

/// Key logged for an item whose own `key()` panicked
const UNKNOWN_ITEM_KEY: &str = "<unknown>";

/// Something a job can process and identify in its logs.
pub trait WorkItem: Send {
    /// Identity used in failure logs and failure samples
    fn key(&self) -> String;
}

impl WorkItem for String {
    fn key(&self) -> String {
        self.clone()
    }
}

impl WorkItem for &str {
    fn key(&self) -> String {
        (*self).to_string()
    }
}

impl WorkItem for EntityId {
    fn key(&self) -> String {
        self.0.clone()
    }
}

impl WorkItem for Entity {
    fn key(&self) -> String {
        self.id.0.clone()
    }
}

macro_rules! numeric_work_item {
    ($($t:ty),*) => {
        $(
            impl WorkItem for $t {
                fn key(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_work_item!(u32, u64, i32, i64, usize);

/// Cooperative cancellation check, consulted only between work items.
pub trait AbortSignal: Send + Sync {
    /// `true` once the orchestrator wants the run to stop
    fn abort_requested(&self) -> bool;
}

impl<F> AbortSignal for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn abort_requested(&self) -> bool {
        self()
    }
}

/// Signal that never asks for an abort
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn abort_requested(&self) -> bool {
        false
    }
}

/// Orchestrator-side abort flag.
///
/// `request` raises the flag from any thread. Observing the raised flag
/// through [`AbortSignal::abort_requested`] lowers it again, so a request is
/// consumed by the run that honours it and does not leak into the next run.
#[derive(Debug, Default, Clone)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    /// Create a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the current run to stop at its next item boundary
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Peek at the flag without consuming it
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl AbortSignal for AbortFlag {
    fn abort_requested(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// A batch job the runner can drive.
#[async_trait]
pub trait BatchJob: Send + Sync {
    /// Registered name, used in logs and in the resulting [`JobRun`]
    fn name(&self) -> &str;

    /// Whether abort requests are honoured
    fn is_abortable(&self) -> bool {
        true
    }

    /// Lazily produce the work items. An `Err` item is a source failure.
    fn items(&self) -> BoxStream<'_, Result<Entity, CoreError>>;

    /// Process one item
    async fn process(&self, item: Entity) -> Result<(), CoreError>;
}

/// One recorded per-item failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Key of the failed item
    pub item: String,
    /// Error message
    pub error: String,
}

/// Result of one batch job execution.
///
/// Counters only grow while the run is in progress. The status stays `None`
/// until the run completes and is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    run_id: Uuid,
    job: String,
    processed: u64,
    failed: u64,
    failures: Vec<ItemFailure>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    status: Option<JobStatus>,
}

impl JobRun {
    fn start(job: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            job: job.to_string(),
            processed: 0,
            failed: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            status: None,
        }
    }

    /// Unique id of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Name of the job
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Items attempted, successful or not
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Items whose processing failed
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Items processed without failure
    pub fn succeeded(&self) -> u64 {
        self.processed - self.failed
    }

    /// Sample of per-item failures, capped by `failure_sample_limit`
    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    /// When the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the run reached its terminal status
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Terminal status, `None` while running
    pub fn status(&self) -> Option<JobStatus> {
        self.status
    }

    /// Scheduler-style `(result, state)` pair for a completed run
    pub fn perform_result(&self) -> Option<PerformResult> {
        self.status.map(PerformResult::from)
    }

    fn record_success(&mut self) {
        self.processed += 1;
    }

    fn record_failure(&mut self, item: String, error: &CoreError, sample_limit: usize) {
        self.processed += 1;
        self.failed += 1;
        if self.failures.len() < sample_limit {
            self.failures.push(ItemFailure {
                item,
                error: error.to_string(),
            });
        }
    }

    fn complete(&mut self, status: JobStatus) {
        if self.status.is_none() {
            self.status = Some(status);
            self.finished_at = Some(Utc::now());
        }
    }
}

/// Drives batch jobs item by item.
pub struct JobRunner {
    config: JobRunnerConfig,
    observer: Arc<dyn ExecutionObserver>,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new(JobRunnerConfig::default())
    }
}

impl JobRunner {
    /// Create a runner with the given settings
    pub fn new(config: JobRunnerConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report finished runs to the given observer
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run a registered [`BatchJob`]. Abort requests are ignored for jobs
    /// that are not abortable.
    pub async fn run_job(&self, job: &dyn BatchJob, abort: &dyn AbortSignal) -> JobRun {
        let abort: &dyn AbortSignal = if job.is_abortable() {
            abort
        } else {
            debug!(job = %job.name(), "Job is not abortable, abort requests are ignored");
            &NeverAbort
        };

        self.run(job.name(), job.items(), |item| job.process(item), abort)
            .await
    }

    /// Drive `items` through `process_one` until the sequence ends, the
    /// source fails, or `abort` asks for a stop.
    pub async fn run<I, S, F, Fut>(
        &self,
        job: &str,
        items: S,
        process_one: F,
        abort: &dyn AbortSignal,
    ) -> JobRun
    where
        I: WorkItem,
        S: Stream<Item = Result<I, CoreError>>,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<(), CoreError>>,
    {
        let mut run = JobRun::start(job);
        let mut items = pin!(items);

        info!(target: JOB_TARGET, job = %job, run_id = %run.run_id, "Starting job");

        loop {
            let next = AssertUnwindSafe(items.next())
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Some(Err(CoreError::from_panic(payload))));

            let item = match next {
                Some(Ok(item)) => item,
                Some(Err(e)) => {
                    error!(
                        target: JOB_TARGET,
                        job = %job,
                        processed = run.processed,
                        failed = run.failed,
                        error = %e,
                        "Item source failed, stopping job"
                    );
                    run.complete(JobStatus::Error);
                    break;
                }
                None => {
                    run.complete(JobStatus::from_counts(run.processed, run.failed));
                    break;
                }
            };

            // Checked once per pulled item; an aborted item is dropped unprocessed.
            match panic::catch_unwind(AssertUnwindSafe(|| abort.abort_requested())) {
                Ok(false) => {}
                Ok(true) => {
                    info!(
                        target: JOB_TARGET,
                        job = %job,
                        processed = run.processed,
                        "Job aborted by request"
                    );
                    run.complete(JobStatus::Aborted);
                    break;
                }
                Err(payload) => {
                    error!(
                        target: JOB_TARGET,
                        job = %job,
                        processed = run.processed,
                        failed = run.failed,
                        error = %CoreError::from_panic(payload),
                        "Abort check failed, stopping job"
                    );
                    run.complete(JobStatus::Error);
                    break;
                }
            }

            let key = panic::catch_unwind(AssertUnwindSafe(|| item.key()))
                .unwrap_or_else(|_| UNKNOWN_ITEM_KEY.to_string());
            let result = AssertUnwindSafe(process_one(item))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(CoreError::from_panic(payload)));

            match result {
                Ok(()) => run.record_success(),
                Err(e) => {
                    warn!(
                        target: JOB_TARGET,
                        job = %job,
                        item = %key,
                        error = %e,
                        "Error processing item"
                    );
                    run.record_failure(key, &e, self.config.failure_sample_limit);
                }
            }

            if self.config.progress_interval > 0 && run.processed % self.config.progress_interval == 0 {
                info!(
                    target: JOB_TARGET,
                    job = %job,
                    processed = run.processed,
                    failed = run.failed,
                    "Job progress"
                );
            }
        }

        info!(
            target: JOB_TARGET,
            job = %job,
            processed = run.processed,
            failed = run.failed,
            status = ?run.status,
            "Job completed"
        );
        self.observer.on_job_finished(&run);
        run
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("config", &self.config)
            .finish()
    }
}
