//! Entity and payload types carried in a [`crate::Context`] result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A domain object that may be recognised by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Fully-qualified class name.
    pub class: String,
    /// Identifier, absent for entities not stored yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Field values.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Create an entity with no identifier and no fields.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            id: None,
            fields: Map::new(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Identifier rendered as a stable storage key.
    pub fn id_key(&self) -> Option<String> {
        self.id.as_ref().map(id_key)
    }
}

/// Render an identifier value as a storage key.
///
/// Strings are used verbatim, so `"7"` and `7` address the same row.
pub fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The work-in-progress output of a chain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// An entity instance (candidate for persistence).
    Entity(Entity),
    /// Loaded or computed data of any shape.
    Data(Value),
}

impl Payload {
    /// The entity, if this payload holds one.
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Data(_) => None,
        }
    }

    /// Mutable access to the entity, if this payload holds one.
    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Data(_) => None,
        }
    }

    /// The data object, if this payload holds a JSON object.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Data(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Mutable access to the data object, if this payload holds a JSON object.
    pub fn as_object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            Self::Data(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

impl From<Entity> for Payload {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}
