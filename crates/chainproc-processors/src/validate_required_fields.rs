//! Required-field validation for entity results.

use chainproc_core::{Context, Payload, ProcessResult, Processor, RecordedError};
use tracing::debug;

/// Records one error per required field that is missing or null on the
/// entity result. Never aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateRequiredFields;

impl ValidateRequiredFields {
    /// Catalog name.
    pub const NAME: &'static str = "validate_required_fields";

    /// Title of the recorded errors.
    pub const TITLE: &'static str = "not blank constraint";

    /// Detail of the recorded errors.
    pub const DETAIL: &'static str = "This value should not be blank.";

    /// Status code of the recorded errors.
    pub const STATUS_CODE: u16 = 400;
}

impl Processor for ValidateRequiredFields {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, context: &mut Context) -> ProcessResult {
        let (Some(config), Some(entity)) = (
            context.config(),
            context.result().and_then(Payload::as_entity),
        ) else {
            return Ok(());
        };

        let blank: Vec<String> = config
            .fields()
            .filter(|(_, field)| field.required && !field.excluded)
            .filter(|(name, _)| entity.field(name).is_none_or(|v| v.is_null()))
            .map(|(name, _)| name.to_string())
            .collect();

        if !blank.is_empty() {
            debug!(class = %entity.class, fields = ?blank, "required fields are blank");
        }

        for name in blank {
            context.add_error(
                RecordedError::new(Self::TITLE)
                    .with_detail(Self::DETAIL)
                    .with_property_path(name)
                    .with_status_code(Self::STATUS_CODE),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainproc_core::{Entity, EntityDefinitionConfig};
    use serde_json::json;

    fn config() -> EntityDefinitionConfig {
        let mut config = EntityDefinitionConfig::new();
        config.add_field("name").set_required();
        config.add_field("email").set_required();
        config.add_field("nickname");
        config.add_field("internal").set_required().set_excluded();
        config
    }

    #[test]
    fn test_records_error_per_blank_field() {
        let entity = Entity::new("Acme\\User").with_field("email", serde_json::Value::Null);
        let mut ctx = Context::new().with_config(config()).with_result(entity);

        ValidateRequiredFields.process(&mut ctx).unwrap();

        let paths: Vec<_> = ctx
            .errors()
            .iter()
            .map(|e| e.property_path.as_deref())
            .collect();
        assert_eq!(paths, vec![Some("name"), Some("email")]);
        assert!(ctx.errors().iter().all(|e| e.status_code == Some(400)));
        assert_eq!(ctx.errors()[0].detail.as_deref(), Some(ValidateRequiredFields::DETAIL));
    }

    #[test]
    fn test_complete_entity_passes() {
        let entity = Entity::new("Acme\\User")
            .with_field("name", "ada")
            .with_field("email", "ada@example.com");
        let mut ctx = Context::new().with_config(config()).with_result(entity);

        ValidateRequiredFields.process(&mut ctx).unwrap();

        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_data_result_is_ignored() {
        let mut ctx = Context::new()
            .with_config(config())
            .with_result(json!({"name": null}));

        ValidateRequiredFields.process(&mut ctx).unwrap();

        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_without_config() {
        let mut ctx = Context::new().with_result(Entity::new("Acme\\User"));
        ValidateRequiredFields.process(&mut ctx).unwrap();
        assert!(!ctx.has_errors());
    }
}
