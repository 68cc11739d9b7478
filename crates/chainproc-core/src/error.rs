//! Error types for chain execution.
//!
//! Two tiers are kept strictly apart:
//! - [`crate::RecordedError`] lives in the [`crate::Context`] and never stops the chain.
//! - [`Abort`] is returned by a processor and terminates the chain immediately.

use thiserror::Error;

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Result type returned by [`crate::Processor::process`].
pub type ProcessResult = std::result::Result<(), Abort>;

/// Errors surfaced by the [`crate::ChainExecutor`].
#[derive(Debug, Error)]
pub enum ChainError {
    /// No processors are registered for the requested action.
    #[error("No processors registered for action: {0}")]
    UnknownAction(String),

    /// A processor aborted the chain.
    #[error("Action '{action}' aborted by processor '{processor}': {source}")]
    Aborted {
        /// The action being executed.
        action: String,
        /// Name of the processor that aborted.
        processor: String,
        /// The abort signal raised by the processor.
        #[source]
        source: Abort,
    },
}

impl ChainError {
    /// The abort signal, if this error came from a processor.
    pub fn abort(&self) -> Option<&Abort> {
        match self {
            Self::Aborted { source, .. } => Some(source),
            Self::UnknownAction(_) => None,
        }
    }

    /// Name of the processor that aborted, if any.
    pub fn processor(&self) -> Option<&str> {
        match self {
            Self::Aborted { processor, .. } => Some(processor),
            Self::UnknownAction(_) => None,
        }
    }
}

/// Fatal signal raised by a processor.
///
/// Covers programming, configuration and authorization failures. Never
/// swallowed by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Abort {
    /// The operation is forbidden in the current execution mode.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// A field declares an association kind no processor knows how to build.
    #[error("Unsupported type of extended association: {0}.")]
    UnsupportedAssociationKind(String),

    /// Invalid processor or field configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A persistence collaborator failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors reported by persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Strict lookup for an entity whose class is not managed.
    #[error("Entity class '{0}' is not manageable")]
    NotManageable(String),

    /// The entity cannot be stored without an identifier.
    #[error("Entity of class '{0}' has no identifier")]
    MissingIdentifier(String),

    /// The storage backend failed.
    #[error("Storage failure: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_kind_message_names_kind() {
        let abort = Abort::UnsupportedAssociationKind("unknown".into());
        assert_eq!(
            abort.to_string(),
            "Unsupported type of extended association: unknown."
        );
    }

    #[test]
    fn test_aborted_accessors() {
        let err = ChainError::Aborted {
            action: "create".into(),
            processor: "reject_master_request".into(),
            source: Abort::AccessDenied("nope".into()),
        };
        assert_eq!(err.processor(), Some("reject_master_request"));
        assert!(matches!(err.abort(), Some(Abort::AccessDenied(_))));
        assert!(err.to_string().contains("create"));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_unknown_action_has_no_abort() {
        let err = ChainError::UnknownAction("get".into());
        assert!(err.abort().is_none());
        assert!(err.processor().is_none());
    }

    #[test]
    fn test_persistence_converts_to_abort() {
        let abort: Abort = PersistenceError::Storage("disk full".into()).into();
        assert!(matches!(abort, Abort::Persistence(_)));
        assert_eq!(abort.to_string(), "Persistence error: Storage failure: disk full");
    }
}
