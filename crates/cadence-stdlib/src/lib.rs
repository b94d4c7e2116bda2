//!
//! Standard library of actions and jobs for the Cadence action core
//!

pub mod actions;
pub mod jobs;

pub use actions::{
    FraudScreening, FraudThresholds, LoyaltyPointsAction, OrderCompletenessCheck,
    PercentageDiscountAction,
};
pub use jobs::EntityBatchJob;

/// Registry factory for the standard actions
pub mod factory {
    use super::*;
    use cadence_core::{ActionRegistry, CadenceConfig, CoreError};
    use std::sync::Arc;
    use tracing::info;

    /// Register every standard action, configured from `config`
    pub fn register_defaults(registry: &ActionRegistry, config: &CadenceConfig) -> Result<(), CoreError> {
        registry.register_simple_decision(OrderCompletenessCheck::new());
        registry.register_decision(Arc::new(FraudScreening::from_config(config)?));
        registry.register_rule(Arc::new(LoyaltyPointsAction::new()));
        registry.register_rule(Arc::new(PercentageDiscountAction::new()));

        info!(
            decisions = ?registry.decision_names(),
            rules = ?registry.rule_names(),
            "Registered standard actions"
        );
        Ok(())
    }

    /// Build a registry holding the standard actions
    pub fn create_registry(config: &CadenceConfig) -> Result<ActionRegistry, CoreError> {
        let registry = ActionRegistry::new();
        register_defaults(&registry, config)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{CadenceConfig, CoreError};
    use crate::factory::create_registry;

    #[test]
    fn test_create_registry() {
        let registry = create_registry(&CadenceConfig::default()).unwrap();

        assert_eq!(
            registry.decision_names(),
            vec![FraudScreening::NAME.to_string(), OrderCompletenessCheck::NAME.to_string()]
        );
        assert_eq!(
            registry.rule_names(),
            vec![LoyaltyPointsAction::NAME.to_string(), PercentageDiscountAction::NAME.to_string()]
        );
        assert!(registry.decision_executor(OrderCompletenessCheck::NAME).is_ok());
        assert!(matches!(
            registry.decision_executor("ship-order"),
            Err(CoreError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let config = CadenceConfig::from_yaml(
            "actions:\n  fraud-screening:\n    review_score: 0.9\n    reject_score: 0.1\n",
        )
        .unwrap();

        assert!(matches!(create_registry(&config), Err(CoreError::Configuration(_))));
    }
}
