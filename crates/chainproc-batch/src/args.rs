//! Mass action input.

use chainproc_core::Entity;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One selected row.
///
/// Rows loaded with their entity carry it as `root_entity`; plain rows carry
/// only column values, from which the identifier is read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub root_entity: Option<Entity>,
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl ResultRecord {
    /// A row holding its entity.
    pub fn with_entity(entity: Entity) -> Self {
        Self {
            root_entity: Some(entity),
            values: Map::new(),
        }
    }

    /// A plain row of column values.
    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            root_entity: None,
            values,
        }
    }

    /// A plain row holding only an identifier column.
    pub fn with_identifier(column: impl Into<String>, id: impl Into<Value>) -> Self {
        let mut values = Map::new();
        values.insert(column.into(), id.into());
        Self::with_values(values)
    }

    /// A column value.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

/// Arguments of a mass delete.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MassDeleteArgs {
    /// Mass action name, used in error messages.
    pub action_name: String,
    /// Class of the entities to delete.
    #[serde(default)]
    pub entity_name: Option<String>,
    /// Identifier column, possibly alias-qualified (`u.id`).
    #[serde(default)]
    pub identifier: Option<String>,
    /// Translation key of the success message.
    #[serde(default)]
    pub success_message: Option<String>,
    /// Selected rows.
    #[serde(default)]
    pub records: Vec<ResultRecord>,
}

impl MassDeleteArgs {
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            ..Self::default()
        }
    }

    pub fn with_entity_name(mut self, entity_name: impl Into<String>) -> Self {
        self.entity_name = Some(entity_name.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_success_message(mut self, key: impl Into<String>) -> Self {
        self.success_message = Some(key.into());
        self
    }

    pub fn with_records(mut self, records: Vec<ResultRecord>) -> Self {
        self.records = records;
        self
    }

    /// Identifier column with any alias prefix removed.
    ///
    /// `None` when missing, empty, or ending in a bare alias (`u.`).
    pub fn identifier_column(&self) -> Option<&str> {
        self.identifier
            .as_deref()?
            .rsplit('.')
            .next()
            .filter(|column| !column.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_column_strips_alias() {
        let args = MassDeleteArgs::new("delete").with_identifier("u.id");
        assert_eq!(args.identifier_column(), Some("id"));

        let args = MassDeleteArgs::new("delete").with_identifier("a.b.uuid");
        assert_eq!(args.identifier_column(), Some("uuid"));

        let args = MassDeleteArgs::new("delete").with_identifier("id");
        assert_eq!(args.identifier_column(), Some("id"));
    }

    #[test]
    fn test_missing_identifier() {
        assert_eq!(MassDeleteArgs::new("delete").identifier_column(), None);
        let args = MassDeleteArgs::new("delete").with_identifier("");
        assert_eq!(args.identifier_column(), None);
        let args = MassDeleteArgs::new("delete").with_identifier("u.");
        assert_eq!(args.identifier_column(), None);
    }

    #[test]
    fn test_deserialize_args() {
        let args: MassDeleteArgs = serde_json::from_value(json!({
            "action_name": "delete",
            "entity_name": "Acme\\User",
            "identifier": "u.id",
            "records": [
                {"values": {"id": 1}},
                {"root_entity": {"class": "Acme\\User", "id": 2}}
            ]
        }))
        .unwrap();

        assert_eq!(args.records.len(), 2);
        assert_eq!(args.records[0].value("id"), Some(&json!(1)));
        assert!(args.records[1].root_entity.is_some());
        assert_eq!(args.success_message, None);
    }
}
