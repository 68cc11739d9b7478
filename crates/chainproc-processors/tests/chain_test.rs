//! Integration tests running built-in processors through the chain executor.

use std::sync::Arc;

use chainproc_core::testing::{MockEntityManagerRegistry, RecordingEntityManager};
use chainproc_core::{
    Abort, ChainError, ChainExecutor, ChainState, Context, Entity, EntityDefinitionConfig,
    FnProcessor, InMemoryEntityStore, ProcessorRegistry, RecordedError, RequestKind,
    StaticAssociationResolver,
};
use chainproc_processors::{
    BuildExtendedAssociations, RejectMasterRequest, SaveEntity, ValidateRequiredFields,
};
use proptest::prelude::*;
use serde_json::json;

fn required_name_config() -> EntityDefinitionConfig {
    let mut config = EntityDefinitionConfig::new();
    config.add_field("name").set_required();
    config
}

fn create_chain(store: &InMemoryEntityStore) -> ChainExecutor {
    let mut registry = ProcessorRegistry::new();
    registry.register("create", ValidateRequiredFields, 10);
    registry.register("create", SaveEntity::new(Arc::new(store.clone())), -10);
    ChainExecutor::new(registry)
}

#[test]
fn test_valid_entity_is_stored() {
    let store = InMemoryEntityStore::new();
    store.manage("Acme\\User");
    let executor = create_chain(&store);

    let ctx = Context::new()
        .with_class_name("Acme\\User")
        .with_config(required_name_config())
        .with_result(Entity::new("Acme\\User").with_id(1).with_field("name", "ada"));

    let ctx = executor.execute("create", ctx).unwrap();

    assert!(!ctx.has_errors());
    assert_eq!(store.count("Acme\\User"), 1);
    assert_eq!(store.flush_count(), 1);
}

#[test]
fn test_invalid_entity_is_never_stored() {
    let store = InMemoryEntityStore::new();
    store.manage("Acme\\User");
    let executor = create_chain(&store);

    let mut ctx = Context::new()
        .with_class_name("Acme\\User")
        .with_config(required_name_config())
        .with_result(Entity::new("Acme\\User").with_id(1));

    let report = executor.process("create", &mut ctx).unwrap();

    assert_eq!(report.state, ChainState::Completed);
    assert_eq!(report.executed, vec!["validate_required_fields"]);
    assert_eq!(report.skipped, vec!["save_entity"]);
    assert_eq!(ctx.errors()[0].property_path.as_deref(), Some("name"));
    assert_eq!(store.count("Acme\\User"), 0);
}

#[test]
fn test_master_request_gate_stops_the_chain() {
    let store = InMemoryEntityStore::new();
    store.manage("Acme\\Attachment");

    let mut registry = ProcessorRegistry::new();
    registry.register(
        "create",
        RejectMasterRequest::new("attachments are created with their email"),
        250,
    );
    registry.register("create", SaveEntity::new(Arc::new(store.clone())), -10);
    let executor = ChainExecutor::new(registry);

    let entity = Entity::new("Acme\\Attachment").with_id(3);

    let err = executor
        .execute("create", Context::new().with_result(entity.clone()))
        .unwrap_err();
    assert_eq!(err.processor(), Some(RejectMasterRequest::NAME));
    assert!(matches!(err.abort(), Some(Abort::AccessDenied(_))));
    assert_eq!(store.count("Acme\\Attachment"), 0);

    let ctx = Context::new()
        .with_request_kind(RequestKind::Sub)
        .with_result(entity);
    executor.execute("create", ctx).unwrap();
    assert_eq!(store.count("Acme\\Attachment"), 1);
}

#[test]
fn test_association_enrichment_in_customize_chain() {
    let resolver = StaticAssociationResolver::new().with_targets(
        "Acme\\Note",
        None,
        "manyToOne",
        "activity",
        [("Acme\\Account", "account"), ("Acme\\Contact", "contact")],
    );
    let mut registry = ProcessorRegistry::new();
    registry.register(
        "customize_loaded_data",
        BuildExtendedAssociations::new(Arc::new(resolver)),
        0,
    );
    let executor = ChainExecutor::new(registry);

    let mut config = EntityDefinitionConfig::new();
    config
        .add_field("activity")
        .set_data_type("association:manyToOne:activity");

    let ctx = Context::new()
        .with_class_name("Acme\\Note")
        .with_config(config)
        .with_result(json!({"account": null, "contact": {"id": 12}}));

    let ctx = executor.execute("customize_loaded_data", ctx).unwrap();
    let data = ctx.result().and_then(|r| r.as_object()).unwrap();
    assert_eq!(
        data["activity"],
        json!({"__class__": "Acme\\Contact", "id": 12})
    );
}

#[test]
fn test_unsupported_association_aborts_chain() {
    let mut registry = ProcessorRegistry::new();
    registry.register(
        "customize_loaded_data",
        BuildExtendedAssociations::new(Arc::new(StaticAssociationResolver::new())),
        0,
    );
    let executor = ChainExecutor::new(registry);

    let mut config = EntityDefinitionConfig::new();
    config
        .add_field("activity")
        .set_data_type("association:sideways:activity");
    let ctx = Context::new()
        .with_class_name("Acme\\Note")
        .with_config(config)
        .with_result(json!({}));

    let err = executor.execute("customize_loaded_data", ctx).unwrap_err();
    match err {
        ChainError::Aborted { source, .. } => assert_eq!(
            source.to_string(),
            "Unsupported type of extended association: sideways."
        ),
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn test_error_recorded_by_earlier_processor_blocks_save() {
    let manager = Arc::new(RecordingEntityManager::new());
    let managers = MockEntityManagerRegistry::new(Arc::clone(&manager));

    let mut registry = ProcessorRegistry::new();
    registry.register(
        "update",
        FnProcessor::new("flag", |ctx: &mut Context| {
            ctx.add_error(RecordedError::new("stale version").with_status_code(409));
            Ok(())
        }),
        5,
    );
    registry.register("update", SaveEntity::new(Arc::new(managers.clone())), 0);
    let executor = ChainExecutor::new(registry);

    let ctx = Context::new().with_result(Entity::new("Acme\\User").with_id(1));
    let ctx = executor.execute("update", ctx).unwrap();

    assert_eq!(ctx.errors().len(), 1);
    assert!(managers.lookups().is_empty());
    assert_eq!(manager.call_count(), 0);
}

fn recorded_error_strategy() -> impl Strategy<Value = RecordedError> {
    ("[a-z ]{1,16}", proptest::option::of("[a-z_.]{1,12}"), proptest::option::of(400u16..500))
        .prop_map(|(title, path, status)| {
            let mut error = RecordedError::new(title);
            if let Some(path) = path {
                error = error.with_property_path(path);
            }
            if let Some(status) = status {
                error = error.with_status_code(status);
            }
            error
        })
}

proptest! {
    /// Property: once any error is recorded, saving never reaches persistence,
    /// whether invoked directly or through the executor.
    #[test]
    fn errors_mean_zero_persistence_calls(
        errors in proptest::collection::vec(recorded_error_strategy(), 1..5),
        id in 0u64..1000,
        through_executor in any::<bool>(),
    ) {
        let manager = Arc::new(RecordingEntityManager::new());
        let managers = MockEntityManagerRegistry::new(Arc::clone(&manager));
        let save = SaveEntity::new(Arc::new(managers.clone()));

        let mut ctx = Context::new().with_result(Entity::new("Acme\\User").with_id(id));
        for error in errors {
            ctx.add_error(error);
        }

        if through_executor {
            let mut registry = ProcessorRegistry::new();
            registry.register("create", save, 0);
            ChainExecutor::new(registry).process("create", &mut ctx).unwrap();
        } else {
            use chainproc_core::Processor;
            save.process(&mut ctx).unwrap();
        }

        prop_assert!(managers.lookups().is_empty());
        prop_assert_eq!(manager.call_count(), 0);
    }
}
