use async_trait::async_trait;
use cadence_core::{ActionContext, CoreError, Entity, SimpleDecisionAction};
use serde::Deserialize;
use tracing::debug;

use super::ORDER_ENTITY;

/// One line of an order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEntry {
    /// Product code
    pub product: String,
    /// Ordered quantity
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
struct OrderSnapshot {
    #[serde(default)]
    entries: Vec<OrderEntry>,
    #[serde(default)]
    delivery_address: Option<serde_json::Value>,
    #[serde(default)]
    payment_authorized: bool,
}

/// Checks that an order can move on to fulfilment: it has at least one
/// entry, every entry has a positive quantity, a delivery address is set and
/// payment is authorized.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderCompletenessCheck;

impl OrderCompletenessCheck {
    /// Registered name
    pub const NAME: &'static str = "order-completeness";

    /// Create the check
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SimpleDecisionAction for OrderCompletenessCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn subject(&self) -> &str {
        ORDER_ENTITY
    }

    async fn decide(&self, order: &Entity, _ctx: &dyn ActionContext) -> Result<bool, CoreError> {
        let snapshot: OrderSnapshot = serde_json::from_value(order.attributes.clone())
            .map_err(|e| CoreError::ActionFailed(format!("malformed order {}: {}", order.id, e)))?;

        if snapshot.entries.is_empty() {
            debug!(order = %order.id, "Order has no entries");
            return Ok(false);
        }

        if let Some(entry) = snapshot.entries.iter().find(|e| e.quantity <= 0) {
            debug!(order = %order.id, product = %entry.product, "Entry has no quantity");
            return Ok(false);
        }

        if snapshot.delivery_address.is_none() {
            debug!(order = %order.id, "Order has no delivery address");
            return Ok(false);
        }

        Ok(snapshot.payment_authorized)
    }
}
