//! In-memory collaborators.
//!
//! Back the CLI and integration tests with the same contracts a real storage,
//! security or translation layer would honour.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, trace};

use crate::entity::{Entity, id_key};
use crate::error::PersistenceError;
use crate::services::{
    AssociationResolver, AssociationTargets, AuthorizationChecker, EntityManager,
    EntityManagerRegistry, PersistenceResult, Translator, substitute,
};

// ─────────────────────────────────────────────────────────────────────────────
// Entity store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StoreInner {
    manageable: RwLock<HashSet<String>>,
    rows: RwLock<HashMap<String, IndexMap<String, Entity>>>,
    next_id: AtomicU64,
    flushes: AtomicUsize,
}

/// Shared in-memory storage for entities, keyed by class and identifier.
///
/// Cloning is cheap and yields a handle to the same storage.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    inner: Arc<StoreInner>,
}

impl InMemoryEntityStore {
    /// Create an empty store that manages no classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a class manageable.
    pub fn manage(&self, class: impl Into<String>) -> &Self {
        self.inner.manageable.write().insert(class.into());
        self
    }

    /// Whether a class is manageable.
    pub fn is_manageable(&self, class: &str) -> bool {
        self.inner.manageable.read().contains(class)
    }

    /// Store an entity directly, bypassing any unit of work.
    ///
    /// Entities without an identifier receive the next sequence number.
    pub fn insert(&self, mut entity: Entity) -> Entity {
        self.assign_identifier(&mut entity);
        let key = entity.id_key().unwrap_or_default();
        self.inner
            .rows
            .write()
            .entry(entity.class.clone())
            .or_default()
            .insert(key, entity.clone());
        entity
    }

    /// Find a stored entity.
    pub fn find(&self, class: &str, id: &Value) -> Option<Entity> {
        self.inner
            .rows
            .read()
            .get(class)
            .and_then(|rows| rows.get(&id_key(id)))
            .cloned()
    }

    /// All stored entities of a class, in insertion order.
    pub fn all(&self, class: &str) -> Vec<Entity> {
        self.inner
            .rows
            .read()
            .get(class)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of stored entities of a class.
    pub fn count(&self, class: &str) -> usize {
        self.inner.rows.read().get(class).map_or(0, |rows| rows.len())
    }

    /// Number of flushes that wrote at least one change.
    pub fn flush_count(&self) -> usize {
        self.inner.flushes.load(Ordering::SeqCst)
    }

    /// Give an id-less entity the next free sequence number, or move the
    /// sequence past an explicit numeric identifier.
    fn assign_identifier(&self, entity: &mut Entity) {
        match entity.id {
            None => {
                let next = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                entity.id = Some(Value::from(next));
            }
            Some(ref id) => {
                let numeric = id
                    .as_u64()
                    .or_else(|| id.as_str().and_then(|s| s.parse().ok()));
                if let Some(n) = numeric {
                    self.inner.next_id.fetch_max(n, Ordering::SeqCst);
                }
            }
        }
    }

    fn delete(&self, entity: &Entity) -> PersistenceResult<()> {
        let key = entity
            .id_key()
            .ok_or_else(|| PersistenceError::MissingIdentifier(entity.class.clone()))?;
        if let Some(rows) = self.inner.rows.write().get_mut(&entity.class) {
            rows.shift_remove(&key);
        }
        Ok(())
    }

    fn session(&self) -> Arc<dyn EntityManager> {
        Arc::new(InMemoryEntityManager {
            store: self.clone(),
            staged: Mutex::new(Vec::new()),
        })
    }
}

impl std::fmt::Debug for InMemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.inner.rows.read();
        f.debug_struct("InMemoryEntityStore")
            .field("classes", &rows.keys().collect::<Vec<_>>())
            .field("flushes", &self.flush_count())
            .finish()
    }
}

impl EntityManagerRegistry for InMemoryEntityStore {
    fn manager_for(
        &self,
        entity: &Entity,
        strict: bool,
    ) -> PersistenceResult<Option<Arc<dyn EntityManager>>> {
        if self.is_manageable(&entity.class) {
            return Ok(Some(self.session()));
        }
        if strict {
            return Err(PersistenceError::NotManageable(entity.class.clone()));
        }
        Ok(None)
    }

    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn EntityManager>> {
        self.is_manageable(class).then(|| self.session())
    }
}

#[derive(Debug)]
enum Staged {
    Persist(Entity),
    Remove(Entity),
}

/// A unit of work over an [`InMemoryEntityStore`].
struct InMemoryEntityManager {
    store: InMemoryEntityStore,
    staged: Mutex<Vec<Staged>>,
}

impl EntityManager for InMemoryEntityManager {
    fn persist(&self, entity: &Entity) -> PersistenceResult<Entity> {
        let mut managed = entity.clone();
        self.store.assign_identifier(&mut managed);
        self.staged.lock().push(Staged::Persist(managed.clone()));
        Ok(managed)
    }

    fn remove(&self, entity: &Entity) -> PersistenceResult<()> {
        if entity.id.is_none() {
            return Err(PersistenceError::MissingIdentifier(entity.class.clone()));
        }
        self.staged.lock().push(Staged::Remove(entity.clone()));
        Ok(())
    }

    fn flush(&self, _entity: Option<&Entity>) -> PersistenceResult<()> {
        let staged: Vec<Staged> = std::mem::take(&mut *self.staged.lock());
        if staged.is_empty() {
            return Ok(());
        }
        trace!(changes = staged.len(), "flushing unit of work");
        for change in staged {
            match change {
                Staged::Persist(entity) => {
                    self.store.insert(entity);
                }
                Staged::Remove(entity) => self.store.delete(&entity)?,
            }
        }
        self.store.inner.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) {
        let dropped = std::mem::take(&mut *self.staged.lock()).len();
        if dropped > 0 {
            debug!(dropped, "cleared unit of work with unflushed changes");
        }
    }

    fn reference(&self, class: &str, id: &Value) -> PersistenceResult<Option<Entity>> {
        Ok(self.store.find(class, id))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Association resolver
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AssociationKey {
    owner: String,
    join: Option<String>,
    kind: String,
    label: String,
}

/// Association resolver backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticAssociationResolver {
    targets: HashMap<AssociationKey, AssociationTargets>,
}

impl StaticAssociationResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the targets of one association.
    pub fn with_targets<I, K, V>(
        mut self,
        owner: impl Into<String>,
        join: Option<&str>,
        kind: impl Into<String>,
        label: impl Into<String>,
        targets: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let key = AssociationKey {
            owner: owner.into(),
            join: join.map(str::to_string),
            kind: kind.into(),
            label: label.into(),
        };
        let targets = targets
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.targets.insert(key, targets);
        self
    }
}

impl AssociationResolver for StaticAssociationResolver {
    fn association_targets(
        &self,
        owner_class: &str,
        join_class: Option<&str>,
        kind: &str,
        target_label: &str,
    ) -> AssociationTargets {
        let key = AssociationKey {
            owner: owner_class.to_string(),
            join: join_class.map(str::to_string),
            kind: kind.to_string(),
            label: target_label.to_string(),
        };
        self.targets.get(&key).cloned().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization
// ─────────────────────────────────────────────────────────────────────────────

/// Authorization checker that grants everything except listed denials.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizationChecker {
    denied_classes: HashSet<(String, String)>,
    denied_entities: HashSet<(String, String, String)>,
}

impl StaticAuthorizationChecker {
    /// Grant every permission.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Deny `permission` on every entity of `class`.
    pub fn deny(mut self, permission: impl Into<String>, class: impl Into<String>) -> Self {
        self.denied_classes.insert((permission.into(), class.into()));
        self
    }

    /// Deny `permission` on a single entity.
    pub fn deny_entity(
        mut self,
        permission: impl Into<String>,
        class: impl Into<String>,
        id: &Value,
    ) -> Self {
        self.denied_entities
            .insert((permission.into(), class.into(), id_key(id)));
        self
    }
}

impl AuthorizationChecker for StaticAuthorizationChecker {
    fn is_granted(&self, permission: &str, subject: &Entity) -> bool {
        let class_key = (permission.to_string(), subject.class.clone());
        if self.denied_classes.contains(&class_key) {
            return false;
        }
        match subject.id_key() {
            Some(id) => !self
                .denied_entities
                .contains(&(class_key.0, class_key.1, id)),
            None => true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Translator
// ─────────────────────────────────────────────────────────────────────────────

/// Translator backed by a message catalog.
///
/// Unknown keys translate to themselves, with placeholders still substituted.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from key/template pairs.
    pub fn from_messages<I, K, V>(messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            messages: messages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add one message.
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }
}

impl Translator for CatalogTranslator {
    fn trans(&self, key: &str, params: &[(&str, String)]) -> String {
        let template = self.messages.get(key).map_or(key, |s| s.as_str());
        substitute(template, params)
    }
}
