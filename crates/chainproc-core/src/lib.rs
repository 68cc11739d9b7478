//! Chained request processing core.
//!
//! A request is modelled as a mutable [`Context`] handed through an ordered
//! list of [`Processor`]s registered under an action name. The
//! [`ChainExecutor`] resolves the list from a [`ProcessorRegistry`] and runs
//! it to completion or abort.
//!
//! ```text
//! ┌──────────────┐   resolve(action, ctx)   ┌───────────────────┐
//! │ ChainExecutor│ ───────────────────────▶ │ ProcessorRegistry │
//! └──────┬───────┘                          └───────────────────┘
//!        │ for each processor (priority desc, registration order)
//!        ▼
//! ┌──────────────┐  RecordedError → ctx.errors (chain continues)
//! │  Processor   │  Abort         → ChainError::Aborted (chain stops)
//! └──────────────┘
//! ```
//!
//! Processors reach storage, security and translation only through the
//! collaborator traits in [`services`]; [`memory`] provides in-memory
//! implementations of each.

pub mod context;
pub mod definition;
pub mod entity;
pub mod error;
pub mod executor;
pub mod memory;
pub mod processor;
pub mod registry;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use context::{Context, ContextInput, RecordedError, RequestKind};
pub use definition::{
    EXTENDED_ASSOCIATION_PREFIX, EntityDefinitionConfig, ExtendedAssociation, FieldConfig,
    parse_extended_association,
};
pub use entity::{Entity, Payload, id_key};
pub use error::{Abort, ChainError, PersistenceError, ProcessResult, Result};
pub use executor::{ChainExecutor, ChainState, ExecutionReport};
pub use memory::{
    CatalogTranslator, InMemoryEntityStore, StaticAssociationResolver, StaticAuthorizationChecker,
};
pub use processor::{FnProcessor, ProcessFn, Processor};
pub use registry::{Condition, ProcessorEntry, ProcessorRegistry, Registration};
pub use services::{
    AssociationResolver, AssociationTargets, AuthorizationChecker, EntityManager,
    EntityManagerRegistry, PersistenceResult, Translator, substitute,
};
