use async_trait::async_trait;
use cadence_core::{ActionContext, CadenceConfig, CoreError, DecisionAction, Entity, Transition};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ORDER_ENTITY;

/// Label of the transition that sends an order to manual review
pub const REVIEW: &str = "REVIEW";

/// Score thresholds for [`FraudScreening`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudThresholds {
    /// Scores at or above this go to manual review
    #[serde(default = "default_review_score")]
    pub review_score: f64,
    /// Scores at or above this are rejected outright
    #[serde(default = "default_reject_score")]
    pub reject_score: f64,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self {
            review_score: default_review_score(),
            reject_score: default_reject_score(),
        }
    }
}

fn default_review_score() -> f64 {
    0.5
}

fn default_reject_score() -> f64 {
    0.8
}

impl FraudThresholds {
    fn validate(&self) -> Result<(), CoreError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.review_score) || !in_unit(self.reject_score) {
            return Err(CoreError::Configuration(
                "fraud thresholds must lie within [0, 1]".to_string(),
            ));
        }
        if self.review_score > self.reject_score {
            return Err(CoreError::Configuration(format!(
                "review_score {} exceeds reject_score {}",
                self.review_score, self.reject_score
            )));
        }
        Ok(())
    }
}

/// Three-way fraud decision on an order's `fraud_score` attribute:
/// `OK`, `REVIEW` or `NOK`.
#[derive(Debug, Clone)]
pub struct FraudScreening {
    thresholds: FraudThresholds,
}

impl FraudScreening {
    /// Registered name
    pub const NAME: &'static str = "fraud-screening";

    /// Create the action with explicit thresholds
    pub fn new(thresholds: FraudThresholds) -> Result<Self, CoreError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Create the action from the `fraud-screening` settings in `config`
    pub fn from_config(config: &CadenceConfig) -> Result<Self, CoreError> {
        Self::new(config.action_settings(Self::NAME)?)
    }

    /// Active thresholds
    pub fn thresholds(&self) -> FraudThresholds {
        self.thresholds
    }
}

#[async_trait]
impl DecisionAction for FraudScreening {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn subject(&self) -> &str {
        ORDER_ENTITY
    }

    fn transitions(&self) -> Vec<Transition> {
        vec![Transition::Ok, Transition::Nok, Transition::custom(REVIEW)]
    }

    async fn decide(&self, order: &Entity, _ctx: &dyn ActionContext) -> Result<Transition, CoreError> {
        let score: f64 = order.attribute("fraud_score")?;

        let transition = if score >= self.thresholds.reject_score {
            Transition::Nok
        } else if score >= self.thresholds.review_score {
            Transition::custom(REVIEW)
        } else {
            Transition::Ok
        };

        info!(order = %order.id, score, transition = %transition, "Fraud screening scored order");
        Ok(transition)
    }
}
