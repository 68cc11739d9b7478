//! Collaborator interfaces consumed by processors.
//!
//! Processors never talk to storage, security or translation directly; they
//! receive these traits at construction time. Implementations must be
//! `Send + Sync` so one processor instance can serve concurrent chains.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::PersistenceError;

/// Result type for persistence operations.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// A persistence session (unit of work) for one or more entity classes.
///
/// Changes staged with [`persist`](EntityManager::persist) and
/// [`remove`](EntityManager::remove) are written on
/// [`flush`](EntityManager::flush); [`clear`](EntityManager::clear)
/// discards anything staged and detaches loaded entities.
pub trait EntityManager: Send + Sync {
    /// Stage an insert or update.
    ///
    /// Returns the managed entity, carrying the identifier the session
    /// generated for it when it had none.
    fn persist(&self, entity: &Entity) -> PersistenceResult<Entity>;

    /// Stage a removal.
    fn remove(&self, entity: &Entity) -> PersistenceResult<()>;

    /// Write staged changes. When `entity` is given only its changes are required
    /// to be written.
    fn flush(&self, entity: Option<&Entity>) -> PersistenceResult<()>;

    /// Discard staged changes.
    fn clear(&self);

    /// Load a reference to a stored entity.
    fn reference(&self, class: &str, id: &Value) -> PersistenceResult<Option<Entity>>;
}

/// Resolves the persistence session responsible for an entity.
pub trait EntityManagerRegistry: Send + Sync {
    /// Manager for the entity's class.
    ///
    /// Returns `Ok(None)` when the class is not manageable and `strict` is
    /// false; `Err(NotManageable)` when `strict` is true.
    fn manager_for(
        &self,
        entity: &Entity,
        strict: bool,
    ) -> PersistenceResult<Option<Arc<dyn EntityManager>>>;

    /// Manager for a class name, `None` when the class is not manageable.
    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn EntityManager>>;
}

/// Authorization collaborator.
pub trait AuthorizationChecker: Send + Sync {
    /// Whether `permission` is granted on `subject`.
    fn is_granted(&self, permission: &str, subject: &Entity) -> bool;
}

/// Ordered mapping of target class to the result field holding its identifier(s).
pub type AssociationTargets = IndexMap<String, String>;

/// Resolves the targets of a computed multi-target association.
pub trait AssociationResolver: Send + Sync {
    /// Targets for `(owner class, join class, kind, target label)`.
    fn association_targets(
        &self,
        owner_class: &str,
        join_class: Option<&str>,
        kind: &str,
        target_label: &str,
    ) -> AssociationTargets;
}

/// Translation collaborator.
pub trait Translator: Send + Sync {
    /// Translate `key`, replacing each parameter placeholder with its value.
    fn trans(&self, key: &str, params: &[(&str, String)]) -> String;
}

/// Replace every placeholder in `template` with its value.
pub fn substitute(template: &str, params: &[(&str, String)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}
