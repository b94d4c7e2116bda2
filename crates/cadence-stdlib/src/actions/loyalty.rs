use async_trait::async_trait;
use cadence_core::{ActionContext, CoreError, Fact, ParameterSpec, Parameters, RuleAction};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::CUSTOMER_ENTITY;

/// Fact kind emitted by [`LoyaltyPointsAction`]
pub const LOYALTY_POINTS_FACT: &str = "loyalty_points";

/// Loyalty points awarded by a promotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyPoints {
    /// Points to credit
    pub points: f64,
    /// Customer to credit, when the rule engine exposed one
    pub customer: Option<String>,
}

/// Awards the rule's `points` parameter as loyalty points.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoyaltyPointsAction;

impl LoyaltyPointsAction {
    /// Registered name
    pub const NAME: &'static str = "loyalty-points";

    /// Create the action
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuleAction for LoyaltyPointsAction {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::decimal("points").positive()]
    }

    async fn apply(&self, params: &Parameters, ctx: &dyn ActionContext) -> Result<Vec<Fact>, CoreError> {
        let points = params
            .decimal("points")
            .ok_or_else(|| CoreError::MissingParameter("points".to_string()))?;
        let customer = ctx.entity(CUSTOMER_ENTITY).map(|c| c.id.to_string());

        info!(points, customer = ?customer, "Awarding loyalty points");

        let award = LoyaltyPoints { points, customer };
        Ok(vec![Fact::from_serializable(LOYALTY_POINTS_FACT, &award)?])
    }
}
