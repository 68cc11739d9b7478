//! Mass action error types.

use chainproc_core::PersistenceError;
use thiserror::Error;

/// Result type for mass actions.
pub type Result<T> = std::result::Result<T, MassActionError>;

/// Configuration and collaborator failures of a mass action.
///
/// Unsupported methods are not errors; they produce an unsuccessful
/// [`crate::MassActionResponse`].
#[derive(Debug, Error)]
pub enum MassActionError {
    #[error("Mass action \"{0}\" must define entity name")]
    MissingEntityName(String),

    #[error("Mass action \"{0}\" must define identifier name")]
    MissingIdentifier(String),

    #[error("Entity class '{0}' has no entity manager")]
    NotManageable(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
