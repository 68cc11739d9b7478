//! Commits the entity held in the context result.

use std::sync::Arc;

use chainproc_core::{Context, EntityManagerRegistry, Payload, ProcessResult, Processor};
use tracing::{debug, trace};

/// Persists and flushes an entity result through its entity manager.
///
/// Does nothing when the context already holds errors, the result is not an
/// entity, or no manager is responsible for the entity's class. After the
/// commit the result holds the managed entity, so a generated identifier is
/// visible to later processors and to the caller.
#[derive(Clone)]
pub struct SaveEntity {
    managers: Arc<dyn EntityManagerRegistry>,
}

impl SaveEntity {
    /// Catalog name.
    pub const NAME: &'static str = "save_entity";

    pub fn new(managers: Arc<dyn EntityManagerRegistry>) -> Self {
        Self { managers }
    }
}

impl std::fmt::Debug for SaveEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveEntity").finish_non_exhaustive()
    }
}

impl Processor for SaveEntity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, context: &mut Context) -> ProcessResult {
        if context.has_errors() {
            // never persist an entity that failed validation
            return Ok(());
        }

        let Some(entity) = context.result().and_then(Payload::as_entity) else {
            return Ok(());
        };

        let Some(manager) = self.managers.manager_for(entity, false)? else {
            trace!(class = %entity.class, "entity is not manageable, nothing to save");
            return Ok(());
        };

        let managed = manager.persist(entity)?;
        manager.flush(Some(&managed))?;
        debug!(class = %managed.class, id = ?managed.id, "entity saved");

        if let Some(result) = context.result_mut().and_then(Payload::as_entity_mut) {
            *result = managed;
        }

        Ok(())
    }

    fn requires_clean_context(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainproc_core::testing::{ManagerCall, MockEntityManagerRegistry, RecordingEntityManager};
    use chainproc_core::{Abort, Entity, InMemoryEntityStore, PersistenceError, RecordedError};
    use serde_json::json;

    fn setup() -> (Arc<RecordingEntityManager>, MockEntityManagerRegistry, SaveEntity) {
        let manager = Arc::new(RecordingEntityManager::new());
        let registry = MockEntityManagerRegistry::new(Arc::clone(&manager));
        let processor = SaveEntity::new(Arc::new(registry.clone()));
        (manager, registry, processor)
    }

    #[test]
    fn test_skips_when_errors_exist() {
        let (manager, registry, processor) = setup();
        let mut ctx = Context::new().with_result(Entity::new("Acme\\User"));
        ctx.add_error(RecordedError::new("invalid"));

        processor.process(&mut ctx).unwrap();

        assert!(registry.lookups().is_empty());
        assert_eq!(manager.call_count(), 0);
        assert!(processor.requires_clean_context());
    }

    #[test]
    fn test_skips_without_result() {
        let (manager, registry, processor) = setup();
        let mut ctx = Context::new();

        processor.process(&mut ctx).unwrap();

        assert!(registry.lookups().is_empty());
        assert_eq!(manager.call_count(), 0);
    }

    #[test]
    fn test_skips_non_entity_result() {
        let (manager, registry, processor) = setup();
        let mut ctx = Context::new().with_result(json!([]));

        processor.process(&mut ctx).unwrap();

        assert!(registry.lookups().is_empty());
        assert_eq!(manager.call_count(), 0);
    }

    #[test]
    fn test_skips_unmanageable_entity() {
        let registry = MockEntityManagerRegistry::unmanaged();
        let processor = SaveEntity::new(Arc::new(registry.clone()));
        let mut ctx = Context::new().with_result(Entity::new("Acme\\Plain"));

        processor.process(&mut ctx).unwrap();

        // looked up once, non-strict
        assert_eq!(registry.lookups(), vec![("Acme\\Plain".to_string(), false)]);
    }

    #[test]
    fn test_persists_and_flushes_manageable_entity() {
        let (manager, registry, processor) = setup();
        let entity = Entity::new("Acme\\User").with_field("name", "ada");
        let mut ctx = Context::new().with_result(entity.clone());

        processor.process(&mut ctx).unwrap();

        assert_eq!(registry.lookups(), vec![("Acme\\User".to_string(), false)]);
        assert_eq!(
            manager.calls(),
            vec![
                ManagerCall::Persist(entity.clone()),
                ManagerCall::Flush(Some(entity)),
            ]
        );
    }

    #[test]
    fn test_generated_identifier_is_written_back() {
        let store = InMemoryEntityStore::new();
        store.manage("Acme\\User");
        store.insert(Entity::new("Acme\\User").with_id(1).with_field("name", "seeded"));
        let processor = SaveEntity::new(Arc::new(store.clone()));
        let mut ctx =
            Context::new().with_result(Entity::new("Acme\\User").with_field("name", "ada"));

        processor.process(&mut ctx).unwrap();

        let saved = ctx.result().and_then(Payload::as_entity).unwrap();
        assert_eq!(saved.id, Some(json!(2)));
        assert_eq!(saved.field("name"), Some(&json!("ada")));
        assert_eq!(store.count("Acme\\User"), 2);
        assert_eq!(
            store.find("Acme\\User", &json!(1)).unwrap().field("name"),
            Some(&json!("seeded"))
        );
    }

    #[test]
    fn test_persistence_failure_aborts() {
        let manager = Arc::new(
            RecordingEntityManager::new()
                .failing_with(PersistenceError::Storage("disk full".into())),
        );
        let processor = SaveEntity::new(Arc::new(MockEntityManagerRegistry::new(Arc::clone(
            &manager,
        ))));
        let mut ctx = Context::new().with_result(Entity::new("Acme\\User"));

        let err = processor.process(&mut ctx).unwrap_err();

        assert_eq!(
            err,
            Abort::Persistence(PersistenceError::Storage("disk full".into()))
        );
        // flush is never reached after a failed persist
        assert_eq!(manager.flush_count(), 0);
    }
}
