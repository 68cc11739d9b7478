//! Builds processor registries from configuration.
//!
//! Configuration refers to processors by name; the catalog owns the shared
//! collaborators and turns each `[actions.<name>]` entry into a registration
//! with its priority and conditions.

use std::collections::BTreeMap;
use std::sync::Arc;

use chainproc_config::{ActionConfig, ProcessorConfig};
use chainproc_core::{
    AssociationResolver, Condition, EntityManagerRegistry, Processor, ProcessorRegistry,
    Registration,
};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::{BuildExtendedAssociations, RejectMasterRequest, SaveEntity, ValidateRequiredFields};

/// Names the catalog can instantiate.
pub const PROCESSOR_NAMES: &[&str] = &[
    SaveEntity::NAME,
    BuildExtendedAssociations::NAME,
    RejectMasterRequest::NAME,
    ValidateRequiredFields::NAME,
];

/// Collaborators shared by every processor the catalog creates.
#[derive(Clone)]
pub struct ProcessorCatalog {
    managers: Arc<dyn EntityManagerRegistry>,
    associations: Arc<dyn AssociationResolver>,
}

impl ProcessorCatalog {
    pub fn new(
        managers: Arc<dyn EntityManagerRegistry>,
        associations: Arc<dyn AssociationResolver>,
    ) -> Self {
        Self {
            managers,
            associations,
        }
    }

    /// Instantiate one configured processor.
    ///
    /// Returns `None` for names the catalog does not know.
    pub fn instantiate(&self, config: &ProcessorConfig) -> Option<Arc<dyn Processor>> {
        let processor: Arc<dyn Processor> = match config.name.as_str() {
            SaveEntity::NAME => Arc::new(SaveEntity::new(Arc::clone(&self.managers))),
            BuildExtendedAssociations::NAME => Arc::new(BuildExtendedAssociations::new(
                Arc::clone(&self.associations),
            )),
            RejectMasterRequest::NAME => Arc::new(match config.message {
                Some(ref message) => RejectMasterRequest::new(message.clone()),
                None => RejectMasterRequest::default(),
            }),
            ValidateRequiredFields::NAME => Arc::new(ValidateRequiredFields),
            _ => return None,
        };
        Some(processor)
    }

    /// The registration for one configured processor, with its conditions.
    pub fn registration(&self, action: &str, config: &ProcessorConfig) -> Result<Registration> {
        let processor = self
            .instantiate(config)
            .ok_or_else(|| CatalogError::UnknownProcessor {
                action: action.to_string(),
                name: config.name.clone(),
                known: PROCESSOR_NAMES.join(", "),
            })?;

        let mut registration = Registration::from_arc(processor).with_priority(config.priority);
        if let Some(ref class) = config.class {
            registration = registration.when(Condition::class_name(class.clone()));
        }
        if let Some(kind) = config.request {
            registration = registration.when(Condition::request_kind(kind));
        }
        Ok(registration)
    }

    /// Build a registry holding every configured action.
    pub fn build_registry(
        &self,
        actions: &BTreeMap<String, ActionConfig>,
    ) -> Result<ProcessorRegistry> {
        let mut registry = ProcessorRegistry::new();
        for (action, config) in actions {
            for processor in &config.processors {
                registry.add(action.clone(), self.registration(action, processor)?);
            }
            debug!(
                action = %action,
                processors = config.processors.len(),
                "action registered"
            );
        }
        Ok(registry)
    }
}

impl std::fmt::Debug for ProcessorCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorCatalog")
            .field("processors", &PROCESSOR_NAMES)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainproc_core::{Context, InMemoryEntityStore, RequestKind, StaticAssociationResolver};

    fn catalog() -> ProcessorCatalog {
        ProcessorCatalog::new(
            Arc::new(InMemoryEntityStore::new()),
            Arc::new(StaticAssociationResolver::new()),
        )
    }

    fn actions(processors: Vec<ProcessorConfig>) -> BTreeMap<String, ActionConfig> {
        BTreeMap::from([("create".to_string(), ActionConfig { processors })])
    }

    #[test]
    fn test_every_listed_name_instantiates() {
        let catalog = catalog();
        for name in PROCESSOR_NAMES {
            let processor = catalog.instantiate(&ProcessorConfig::new(*name)).unwrap();
            assert_eq!(processor.name(), *name);
        }
    }

    #[test]
    fn test_unknown_processor_is_an_error() {
        let err = catalog()
            .build_registry(&actions(vec![ProcessorConfig::new("teleport")]))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'teleport'"));
        assert!(message.contains("'create'"));
        assert!(message.contains("save_entity"));
    }

    #[test]
    fn test_priorities_are_applied() {
        let registry = catalog()
            .build_registry(&actions(vec![
                ProcessorConfig::new("save_entity").with_priority(-10),
                ProcessorConfig::new("validate_required_fields").with_priority(10),
            ]))
            .unwrap();

        let names: Vec<&str> = registry.entries("create").iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["validate_required_fields", "save_entity"]);
    }

    #[test]
    fn test_conditions_are_applied() {
        let registry = catalog()
            .build_registry(&actions(vec![
                ProcessorConfig::new("reject_master_request")
                    .with_class("Acme\\Attachment")
                    .with_request(RequestKind::Master),
            ]))
            .unwrap();

        let entry = &registry.entries("create")[0];
        assert!(entry.is_conditional());

        let attachment = Context::new().with_class_name("Acme\\Attachment");
        assert!(entry.applies_to(&attachment));
        assert!(!entry.applies_to(&attachment.clone().with_request_kind(RequestKind::Sub)));
        assert!(!entry.applies_to(&Context::new().with_class_name("Acme\\Email")));
    }

    #[test]
    fn test_configured_message_is_used() {
        let processor = catalog()
            .instantiate(&ProcessorConfig::new("reject_master_request").with_message("nope"))
            .unwrap();
        let err = processor.process(&mut Context::new()).unwrap_err();
        assert_eq!(err.to_string(), "Access denied: nope");
    }
}
