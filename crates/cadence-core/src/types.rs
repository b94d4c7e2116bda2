//! Entities the orchestrator hands to actions and facts actions hand back to
//! the rule engine.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Value object: identifier of an orchestrator-owned entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of an entity the orchestrator exposes to an action,
/// e.g. the order a workflow is processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier, used in every log line about this entity
    pub id: EntityId,
    /// Entity kind, e.g. `"order"`
    pub kind: String,
    /// Entity attributes as a JSON object
    pub attributes: serde_json::Value,
}

impl Entity {
    /// Create a new entity
    pub fn new(id: impl Into<String>, kind: impl Into<String>, attributes: serde_json::Value) -> Self {
        Self {
            id: EntityId(id.into()),
            kind: kind.into(),
            attributes,
        }
    }

    /// Raw attribute lookup
    #[inline]
    pub fn raw_attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Deserialize one attribute into `T`
    pub fn attribute<T>(&self, key: &str) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
    {
        let value = self.attributes.get(key).ok_or_else(|| {
            CoreError::ActionFailed(format!("entity {} has no attribute '{}'", self.id, key))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::ActionFailed(format!(
                "entity {} attribute '{}' is malformed: {}",
                self.id, key, e
            ))
        })
    }
}

/// A derived value emitted by a rule action for insertion into the rule
/// engine's working memory. Opaque to the core and immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    kind: String,
    payload: serde_json::Value,
}

impl Fact {
    /// Create a fact from a raw JSON payload
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Create a fact from any serializable value
    pub fn from_serializable<T>(kind: impl Into<String>, value: &T) -> Result<Self, CoreError>
    where
        T: Serialize,
    {
        Ok(Self::new(kind, serde_json::to_value(value)?))
    }

    /// Fact kind, e.g. `"loyalty_points"`
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Fact payload
    #[inline]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Deserialize the payload into `T`
    pub fn to<T>(&self) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_attributes() {
        let order = Entity::new("ord-1", "order", json!({"total": 42.5, "entries": 3}));
        assert_eq!(order.id, EntityId("ord-1".to_string()));
        assert_eq!(order.attribute::<f64>("total").unwrap(), 42.5);
        assert_eq!(order.attribute::<u32>("entries").unwrap(), 3);
        assert!(order.raw_attribute("missing").is_none());
        assert!(matches!(
            order.attribute::<u32>("missing"),
            Err(CoreError::ActionFailed(_))
        ));
        assert!(matches!(
            order.attribute::<String>("total"),
            Err(CoreError::ActionFailed(_))
        ));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Award {
        points: u64,
    }

    #[test]
    fn test_fact_payload() {
        let fact = Fact::from_serializable("loyalty_points", &Award { points: 10 }).unwrap();
        assert_eq!(fact.kind(), "loyalty_points");
        assert_eq!(fact.payload(), &json!({"points": 10}));
        assert_eq!(fact.to::<Award>().unwrap(), Award { points: 10 });
    }
}
