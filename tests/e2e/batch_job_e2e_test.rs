use cadence_core::{AbortFlag, Entity, JobRunner, JobRunnerConfig, JobStatus, NeverAbort, PerformResult};
use cadence_core::{CompletionResult, CoreError, RunState};
use cadence_stdlib::EntityBatchJob;
use cadence_test_utils::{
    failing_source, init_test_tracing, numbered_items, AbortAfterChecks, RecordingObserver,
    ScriptedProcessor,
};
use serde_json::json;
use std::sync::Arc;

/// Scenario C: 10 items, items 3 and 7 fail, no abort
#[tokio::test]
async fn test_individual_failures_give_warning() {
    init_test_tracing();

    let processor = ScriptedProcessor::failing_on([3, 7]);
    let run = JobRunner::default()
        .run("catalog-sync", numbered_items(10), |item| processor.process(item), &NeverAbort)
        .await;

    assert_eq!(run.processed(), 10);
    assert_eq!(run.failed(), 2);
    assert_eq!(run.status(), Some(JobStatus::Warning));
    assert_eq!(
        run.perform_result(),
        Some(PerformResult {
            result: CompletionResult::Warning,
            state: RunState::Finished
        })
    );
    let failed_items: Vec<&str> = run.failures().iter().map(|f| f.item.as_str()).collect();
    assert_eq!(failed_items, vec!["3", "7"]);
}

/// Scenario D: abort requested before item 5 of 10
#[tokio::test]
async fn test_abort_before_fifth_item() {
    init_test_tracing();

    let processor = ScriptedProcessor::default();
    let abort = AbortAfterChecks::new(4);
    let run = JobRunner::default()
        .run("catalog-sync", numbered_items(10), |item| processor.process(item), &abort)
        .await;

    assert_eq!(run.processed(), 4);
    assert_eq!(run.status(), Some(JobStatus::Aborted));
    assert_eq!(processor.seen(), vec![1, 2, 3, 4]);
    assert_eq!(abort.queries(), 5);
    assert_eq!(
        run.perform_result().map(|r| r.result),
        Some(CompletionResult::Unknown)
    );
}

#[tokio::test]
async fn test_source_failure_stops_the_run() {
    let observer = Arc::new(RecordingObserver::new());
    let processor = ScriptedProcessor::default();
    let run = JobRunner::default()
        .with_observer(observer.clone())
        .run("catalog-sync", failing_source(10, 6), |item| processor.process(item), &NeverAbort)
        .await;

    assert_eq!(run.status(), Some(JobStatus::Error));
    assert_eq!(run.processed(), 5);
    assert_eq!(processor.seen(), vec![1, 2, 3, 4, 5]);
    assert_eq!(observer.job_statuses(), vec![Some(JobStatus::Error)]);
    assert_eq!(
        run.perform_result().map(|r| r.state),
        Some(RunState::Aborted)
    );
}

#[tokio::test]
async fn test_orchestrator_abort_flag_between_runs() {
    let products: Vec<Entity> = (1..=3)
        .map(|i| Entity::new(format!("sku-{}", i), "product", json!({ "price": i * 10 })))
        .collect();
    let job = EntityBatchJob::new("price-export", products, |product| {
        let price: u64 = product.attribute("price")?;
        if price == 0 {
            return Err(CoreError::ItemFailed("zero price".into()));
        }
        Ok(())
    });

    let runner = JobRunner::new(JobRunnerConfig {
        progress_interval: 1,
        failure_sample_limit: 10,
    });
    let flag = AbortFlag::new();
    flag.request();

    let aborted = runner.run_job(&job, &flag).await;
    assert_eq!(aborted.status(), Some(JobStatus::Aborted));

    let rerun = runner.run_job(&job, &flag).await;
    assert_eq!(rerun.status(), Some(JobStatus::Success));
    assert_eq!(rerun.processed(), 3);
    assert_ne!(aborted.run_id(), rerun.run_id());
}
