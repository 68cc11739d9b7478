//! Call-recording collaborator doubles.
//!
//! Enabled for this crate's tests and for downstream crates through the
//! `testing` feature.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::PersistenceError;
use crate::services::{
    AssociationResolver, AssociationTargets, EntityManager, EntityManagerRegistry,
    PersistenceResult,
};

/// A call observed by a [`RecordingEntityManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerCall {
    /// `persist` with the entity passed in.
    Persist(Entity),
    /// `remove` with the entity passed in.
    Remove(Entity),
    /// `flush`, optionally scoped to one entity.
    Flush(Option<Entity>),
    /// `clear`.
    Clear,
    /// `reference` with class and identifier.
    Reference(String, Value),
}

/// Entity manager that records every call and stores nothing.
#[derive(Debug, Default)]
pub struct RecordingEntityManager {
    calls: Mutex<Vec<ManagerCall>>,
    fail_with: Mutex<Option<PersistenceError>>,
    references: Mutex<Vec<Entity>>,
}

impl RecordingEntityManager {
    /// Create a manager with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every persist, remove and flush call fail with `error`.
    pub fn failing_with(self, error: PersistenceError) -> Self {
        *self.fail_with.lock() = Some(error);
        self
    }

    /// Make `reference` return this entity when class and identifier match.
    pub fn with_reference(self, entity: Entity) -> Self {
        self.references.lock().push(entity);
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<ManagerCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of persist calls.
    pub fn persist_count(&self) -> usize {
        self.count(|c| matches!(c, ManagerCall::Persist(_)))
    }

    /// Number of remove calls.
    pub fn remove_count(&self) -> usize {
        self.count(|c| matches!(c, ManagerCall::Remove(_)))
    }

    /// Number of flush calls.
    pub fn flush_count(&self) -> usize {
        self.count(|c| matches!(c, ManagerCall::Flush(_)))
    }

    /// Number of clear calls.
    pub fn clear_count(&self) -> usize {
        self.count(|c| matches!(c, ManagerCall::Clear))
    }

    fn count(&self, pred: impl Fn(&ManagerCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: ManagerCall) -> PersistenceResult<()> {
        self.calls.lock().push(call);
        match self.fail_with.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl EntityManager for RecordingEntityManager {
    fn persist(&self, entity: &Entity) -> PersistenceResult<Entity> {
        self.record(ManagerCall::Persist(entity.clone()))?;
        Ok(entity.clone())
    }

    fn remove(&self, entity: &Entity) -> PersistenceResult<()> {
        self.record(ManagerCall::Remove(entity.clone()))
    }

    fn flush(&self, entity: Option<&Entity>) -> PersistenceResult<()> {
        self.record(ManagerCall::Flush(entity.cloned()))
    }

    fn clear(&self) {
        self.calls.lock().push(ManagerCall::Clear);
    }

    fn reference(&self, class: &str, id: &Value) -> PersistenceResult<Option<Entity>> {
        self.calls
            .lock()
            .push(ManagerCall::Reference(class.to_string(), id.clone()));
        let key = crate::entity::id_key(id);
        Ok(self
            .references
            .lock()
            .iter()
            .find(|e| e.class == class && e.id_key().as_deref() == Some(key.as_str()))
            .cloned())
    }
}

/// Registry double handing out one shared [`RecordingEntityManager`].
#[derive(Debug, Clone)]
pub struct MockEntityManagerRegistry {
    manager: Option<Arc<RecordingEntityManager>>,
    lookups: Arc<Mutex<Vec<(String, bool)>>>,
}

impl MockEntityManagerRegistry {
    /// Every class is manageable by `manager`.
    pub fn new(manager: Arc<RecordingEntityManager>) -> Self {
        Self {
            manager: Some(manager),
            lookups: Arc::default(),
        }
    }

    /// No class is manageable.
    pub fn unmanaged() -> Self {
        Self {
            manager: None,
            lookups: Arc::default(),
        }
    }

    /// Recorded lookups as `(class, strict)` pairs.
    pub fn lookups(&self) -> Vec<(String, bool)> {
        self.lookups.lock().clone()
    }
}

impl EntityManagerRegistry for MockEntityManagerRegistry {
    fn manager_for(
        &self,
        entity: &Entity,
        strict: bool,
    ) -> PersistenceResult<Option<Arc<dyn EntityManager>>> {
        self.lookups.lock().push((entity.class.clone(), strict));
        match &self.manager {
            Some(manager) => Ok(Some(Arc::clone(manager) as Arc<dyn EntityManager>)),
            None if strict => Err(PersistenceError::NotManageable(entity.class.clone())),
            None => Ok(None),
        }
    }

    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn EntityManager>> {
        self.lookups.lock().push((class.to_string(), false));
        self.manager
            .as_ref()
            .map(|m| Arc::clone(m) as Arc<dyn EntityManager>)
    }
}

/// A resolver lookup observed by [`MockAssociationResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverCall {
    pub owner_class: String,
    pub join_class: Option<String>,
    pub kind: String,
    pub target_label: String,
}

/// Association resolver returning a fixed answer and recording lookups.
#[derive(Debug, Default)]
pub struct MockAssociationResolver {
    targets: AssociationTargets,
    calls: Mutex<Vec<ResolverCall>>,
}

impl MockAssociationResolver {
    /// Resolve every lookup to `targets`.
    pub fn returning<I, K, V>(targets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            targets: targets
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded lookups.
    pub fn calls(&self) -> Vec<ResolverCall> {
        self.calls.lock().clone()
    }
}

impl AssociationResolver for MockAssociationResolver {
    fn association_targets(
        &self,
        owner_class: &str,
        join_class: Option<&str>,
        kind: &str,
        target_label: &str,
    ) -> AssociationTargets {
        self.calls.lock().push(ResolverCall {
            owner_class: owner_class.to_string(),
            join_class: join_class.map(str::to_string),
            kind: kind.to_string(),
            target_label: target_label.to_string(),
        });
        self.targets.clone()
    }
}
