//! Concrete actions

pub mod discount;
pub mod fraud;
pub mod loyalty;
pub mod order_check;

pub use discount::PercentageDiscountAction;
pub use fraud::{FraudScreening, FraudThresholds};
pub use loyalty::LoyaltyPointsAction;
pub use order_check::OrderCompletenessCheck;

/// Entity name under which orchestrators expose the order being processed
pub const ORDER_ENTITY: &str = "order";

/// Entity name under which rule engines expose the customer, when known
pub const CUSTOMER_ENTITY: &str = "customer";
