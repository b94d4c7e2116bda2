// Cadence E2E Tests
//
// End-to-end scenarios driving the action core the way an orchestrator,
// a job scheduler and a rule engine would.

/// Shared fixtures for the E2E tests
pub mod utils {
    use cadence_core::{ActionRegistry, CadenceConfig, Entity, MapContext};
    use cadence_monitoring::{execution_observer, MonitoringConfig};
    use cadence_stdlib::factory::register_defaults;
    use cadence_test_utils::RecordingObserver;
    use serde_json::json;
    use std::sync::Arc;

    /// Registry holding the standard actions, reporting to `observer`
    pub fn standard_registry(observer: Arc<RecordingObserver>) -> ActionRegistry {
        let registry = ActionRegistry::new().with_observer(observer);
        register_defaults(&registry, &CadenceConfig::default()).expect("default config is valid");
        registry
    }

    /// Registry reporting to the metrics facade
    pub fn metrics_registry() -> ActionRegistry {
        let registry = ActionRegistry::new().with_observer(execution_observer(&MonitoringConfig::default()));
        register_defaults(&registry, &CadenceConfig::default()).expect("default config is valid");
        registry
    }

    /// An order ready for fulfilment
    pub fn complete_order(id: &str) -> Entity {
        Entity::new(
            id,
            "order",
            json!({
                "entries": [{"product": "sku-1", "quantity": 1}, {"product": "sku-2", "quantity": 3}],
                "delivery_address": {"line1": "1 Main St", "city": "Springfield"},
                "payment_authorized": true,
                "fraud_score": 0.1,
                "total": 120.0
            }),
        )
    }

    /// Order-process context exposing `order`
    pub fn process_context(process: &str, order: Entity) -> MapContext {
        MapContext::new(process).with_entity("order", order)
    }
}
