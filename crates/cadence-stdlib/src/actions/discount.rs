use async_trait::async_trait;
use cadence_core::{ActionContext, CoreError, Fact, ParameterSpec, Parameters, RuleAction};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ORDER_ENTITY;

/// Fact kind emitted by [`PercentageDiscountAction`]
pub const ORDER_DISCOUNT_FACT: &str = "order_discount";

/// Discount granted on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDiscount {
    /// Discounted order
    pub order: String,
    /// Discount rate in percent
    pub percent: f64,
    /// Discount amount in order currency
    pub amount: f64,
}

/// Grants `percent` off the order total, optionally capped at `max_amount`.
///
/// The order must be exposed under the `order` entity with a numeric `total`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentageDiscountAction;

impl PercentageDiscountAction {
    /// Registered name
    pub const NAME: &'static str = "percentage-discount";

    /// Create the action
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuleAction for PercentageDiscountAction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::decimal("percent").range(0.0, 100.0),
            ParameterSpec::decimal("max_amount").optional().positive(),
        ]
    }

    fn validate(&self, params: &Parameters) -> Result<(), CoreError> {
        match params.decimal("percent") {
            Some(percent) if percent > 0.0 => Ok(()),
            other => Err(CoreError::invalid_parameter(
                "percent",
                format!("a zero discount is not a reward (got {:?})", other),
            )),
        }
    }

    async fn apply(&self, params: &Parameters, ctx: &dyn ActionContext) -> Result<Vec<Fact>, CoreError> {
        let order = ctx
            .entity(ORDER_ENTITY)
            .ok_or_else(|| CoreError::MissingEntity(ORDER_ENTITY.to_string()))?;
        let total: f64 = order.attribute("total")?;
        let percent = params
            .decimal("percent")
            .ok_or_else(|| CoreError::MissingParameter("percent".to_string()))?;

        let mut amount = total * percent / 100.0;
        if let Some(cap) = params.decimal("max_amount") {
            amount = amount.min(cap);
        }

        info!(order = %order.id, percent, amount, "Granting order discount");

        let discount = OrderDiscount {
            order: order.id.to_string(),
            percent,
            amount,
        };
        Ok(vec![Fact::from_serializable(ORDER_DISCOUNT_FACT, &discount)?])
    }
}
