use cadence_core::{Fact, MapContext, ParameterSpec, RuleActionAdapter};
use cadence_e2e_tests::utils::{complete_order, standard_registry};
use cadence_test_utils::{init_test_tracing, CountingRule, ObservedEvent, RecordingObserver};
use serde_json::json;
use std::sync::Arc;

/// Scenario E: a negative amount is rejected silently
#[tokio::test]
async fn test_negative_amount_is_not_applied() {
    init_test_tracing();

    let rule = CountingRule::new(
        "store-credit",
        vec![ParameterSpec::decimal("amount").positive()],
        vec![Fact::new("store_credit", json!({"amount": 5}))],
    );
    let calls = rule.counter();
    let adapter = RuleActionAdapter::new(Arc::new(rule));

    let ctx = MapContext::new("promo-E").with_parameter("amount", json!(-5));
    let result = adapter.apply(&ctx).await;

    assert!(!result.is_applied());
    assert!(result.facts().is_empty());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_standard_promotions() {
    let observer = Arc::new(RecordingObserver::new());
    let registry = standard_registry(observer.clone());

    let loyalty = registry.rule_adapter("loyalty-points").unwrap();
    let ctx = MapContext::new("promo-1").with_parameter("points", json!("250"));
    let result = loyalty.apply(&ctx).await;
    assert!(result.is_applied());
    assert_eq!(result.facts()[0].kind(), "loyalty_points");

    let discount = registry.rule_adapter("percentage-discount").unwrap();
    let ctx = MapContext::new("promo-2")
        .with_entity("order", complete_order("ord-9"))
        .with_parameter("percent", json!(25));
    let result = discount.apply(&ctx).await;
    assert!(result.is_applied());
    assert_eq!(result.facts()[0].payload()["amount"], json!(30.0));

    let rejected = discount
        .apply(&MapContext::new("promo-3").with_parameter("percent", json!("a lot")))
        .await;
    assert!(!rejected.is_applied());

    let rule_events: Vec<ObservedEvent> = observer
        .events()
        .into_iter()
        .filter(|e| matches!(e, ObservedEvent::RuleResult { .. }))
        .collect();
    assert_eq!(rule_events.len(), 3);
    assert_eq!(
        rule_events[2],
        ObservedEvent::RuleResult {
            action: "percentage-discount".to_string(),
            applied: false,
            facts: 0
        }
    );
}
