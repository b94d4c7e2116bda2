//! Context and entity builders.

use cadence_core::{Entity, MapContext};

/// An order entity with the given attributes
pub fn order_entity(id: &str, attributes: serde_json::Value) -> Entity {
    Entity::new(id, "order", attributes)
}

/// A context exposing `order` under the `order` entity name
pub fn order_context(invocation_id: &str, order: Entity) -> MapContext {
    MapContext::new(invocation_id).with_entity("order", order)
}
