//! Field configuration of a target class.
//!
//! Customization-style processors read the [`EntityDefinitionConfig`] attached
//! to a context to decide how to interpret the result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Abort;

/// Data type prefix marking a computed multi-target association.
pub const EXTENDED_ASSOCIATION_PREFIX: &str = "association";

/// Ordered field configuration for one class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinitionConfig {
    #[serde(default)]
    fields: IndexMap<String, FieldConfig>,
}

impl EntityDefinitionConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (or return the existing one) for in-place configuration.
    pub fn add_field(&mut self, name: impl Into<String>) -> &mut FieldConfig {
        self.fields.entry(name.into()).or_default()
    }

    /// Get a field config by name.
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }

    /// Iterate fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Whether any field is configured.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Configuration of a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Declared data type, e.g. `integer` or `association:manyToOne:activity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Excluded fields are never computed or returned.
    #[serde(default)]
    pub excluded: bool,
    /// Required fields must hold a non-null value before saving.
    #[serde(default)]
    pub required: bool,
}

impl FieldConfig {
    /// Set the declared data type.
    pub fn set_data_type(&mut self, data_type: impl Into<String>) -> &mut Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Mark the field as excluded.
    pub fn set_excluded(&mut self) -> &mut Self {
        self.excluded = true;
        self
    }

    /// Mark the field as required.
    pub fn set_required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    /// Parse the data type as an extended association, if it is one.
    pub fn extended_association(&self) -> Result<Option<ExtendedAssociation>, Abort> {
        match self.data_type.as_deref() {
            Some(data_type) => parse_extended_association(data_type),
            None => Ok(None),
        }
    }
}

/// Parsed `association:<kind>:<target label>` data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedAssociation {
    /// Association kind as written, e.g. `manyToOne`.
    pub kind: String,
    /// Label of the association target group.
    pub target_label: String,
}

/// Parse an extended association data type.
///
/// Returns `Ok(None)` for any other data type. A data type that starts with
/// the association prefix but lacks a kind or label is a configuration error.
pub fn parse_extended_association(data_type: &str) -> Result<Option<ExtendedAssociation>, Abort> {
    let mut parts = data_type.splitn(3, ':');
    if parts.next() != Some(EXTENDED_ASSOCIATION_PREFIX) {
        return Ok(None);
    }

    match (parts.next(), parts.next()) {
        (Some(kind), Some(label)) if !kind.is_empty() && !label.is_empty() => {
            Ok(Some(ExtendedAssociation {
                kind: kind.to_string(),
                target_label: label.to_string(),
            }))
        }
        // bare "association" is a plain data type
        (None, _) => Ok(None),
        _ => Err(Abort::Configuration(format!(
            "Invalid extended association data type '{}', expected 'association:<kind>:<label>'",
            data_type
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_declaration_order() {
        let mut config = EntityDefinitionConfig::new();
        config.add_field("b").set_data_type("integer");
        config.add_field("a").set_required();
        config.add_field("c").set_excluded();

        let names: Vec<&str> = config.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(config.field("a").unwrap().required);
        assert!(config.field("c").unwrap().excluded);
    }

    #[test]
    fn test_add_field_returns_existing() {
        let mut config = EntityDefinitionConfig::new();
        config.add_field("a").set_data_type("string");
        config.add_field("a").set_required();
        let field = config.field("a").unwrap();
        assert_eq!(field.data_type.as_deref(), Some("string"));
        assert!(field.required);
    }

    #[test]
    fn test_parse_extended_association() {
        let parsed = parse_extended_association("association:manyToOne:activity")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.kind, "manyToOne");
        assert_eq!(parsed.target_label, "activity");
    }

    #[test]
    fn test_parse_other_types() {
        assert_eq!(parse_extended_association("integer").unwrap(), None);
        assert_eq!(parse_extended_association("association").unwrap(), None);
        assert_eq!(parse_extended_association("associations:x:y").unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_association() {
        assert!(matches!(
            parse_extended_association("association:manyToOne"),
            Err(Abort::Configuration(_))
        ));
        assert!(matches!(
            parse_extended_association("association::label"),
            Err(Abort::Configuration(_))
        ));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: EntityDefinitionConfig = serde_json::from_value(serde_json::json!({
            "fields": {
                "owner": {"data_type": "association:manyToOne:owner"},
                "name": {"required": true}
            }
        }))
        .unwrap();
        let owner = config.field("owner").unwrap();
        assert!(owner.extended_association().unwrap().is_some());
        assert!(config.field("name").unwrap().required);
    }
}
