use cadence_core::{ActionExecutor, CoreError, ErrorCategory, MapContext, Transition};
use cadence_e2e_tests::utils::{complete_order, metrics_registry, process_context, standard_registry};
use cadence_test_utils::{init_test_tracing, CountingDecision, RecordingObserver};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Scenario A: the entity is present and the decision succeeds
#[tokio::test]
async fn test_present_entity_successful_decision_is_ok() {
    init_test_tracing();

    let spy = CountingDecision::new("payment-check", "order", Ok(true));
    let calls = spy.counter();
    let executor = ActionExecutor::simple(spy);

    let ctx = process_context("order-process-A", complete_order("ord-A"));
    assert_eq!(executor.execute(&ctx).await, Transition::Ok);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Scenario B: no entity, decision logic never runs
#[tokio::test]
async fn test_missing_entity_is_nok_without_calling_logic() {
    init_test_tracing();

    let observer = Arc::new(RecordingObserver::new());
    let spy = CountingDecision::new("payment-check", "order", Ok(true));
    let calls = spy.counter();
    let executor = ActionExecutor::simple(spy).with_observer(observer.clone());

    let ctx = MapContext::new("order-process-B");
    assert_eq!(executor.execute(&ctx).await, Transition::Nok);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(observer.failures(), vec![ErrorCategory::Input]);
}

#[tokio::test]
async fn test_logic_failure_routes_to_nok() {
    let spy = CountingDecision::new(
        "payment-check",
        "order",
        Err(CoreError::ActionFailed("payment provider timeout".into())),
    );
    let executor = ActionExecutor::simple(spy);

    let ctx = process_context("order-process-F", complete_order("ord-F"));
    assert_eq!(executor.execute(&ctx).await, Transition::Nok);
}

#[tokio::test]
async fn test_standard_order_workflow() {
    init_test_tracing();

    let observer = Arc::new(RecordingObserver::new());
    let registry = standard_registry(observer.clone());
    let completeness = registry.decision_executor("order-completeness").unwrap();
    let fraud = registry.decision_executor("fraud-screening").unwrap();

    let ctx = process_context("order-process-1", complete_order("ord-1"));
    assert_eq!(completeness.execute(&ctx).await, Transition::Ok);
    assert_eq!(fraud.execute(&ctx).await, Transition::Ok);

    let mut risky = complete_order("ord-2");
    risky.attributes["fraud_score"] = json!(0.6);
    let ctx = process_context("order-process-2", risky);
    assert_eq!(fraud.execute(&ctx).await, Transition::custom("REVIEW"));

    assert_eq!(
        observer.transitions(),
        vec![Transition::Ok, Transition::Ok, Transition::custom("REVIEW")]
    );
}

#[tokio::test]
async fn test_metrics_observer_does_not_disturb_outcomes() {
    let registry = metrics_registry();
    let executor = registry.decision_executor("order-completeness").unwrap();

    let mut empty = complete_order("ord-3");
    empty.attributes["entries"] = json!([]);

    assert_eq!(
        executor.execute(&process_context("order-process-3", empty)).await,
        Transition::Nok
    );
}
