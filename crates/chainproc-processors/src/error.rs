//! Error types for building processors from configuration.

use thiserror::Error;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while turning configuration into a processor registry.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configuration names a processor the catalog does not know.
    #[error("unknown processor '{name}' in action '{action}' (known: {known})")]
    UnknownProcessor {
        action: String,
        name: String,
        known: String,
    },
}
