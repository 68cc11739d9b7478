//! Built-in processors for chainproc.
//!
//! - [`SaveEntity`]: commits an entity result through its entity manager
//! - [`BuildExtendedAssociations`]: computes multi-target association values
//! - [`RejectMasterRequest`]: restricts an action to sub-requests
//! - [`ValidateRequiredFields`]: records blank required fields
//!
//! [`ProcessorCatalog`] maps configured names to these processors.

pub mod catalog;
pub mod error;
mod extended_associations;
mod reject_master_request;
mod save_entity;
mod validate_required_fields;

pub use catalog::{PROCESSOR_NAMES, ProcessorCatalog};
pub use error::{CatalogError, Result};
pub use extended_associations::{AssociationKind, BuildExtendedAssociations, CLASS_KEY, ID_KEY};
pub use reject_master_request::RejectMasterRequest;
pub use save_entity::SaveEntity;
pub use validate_required_fields::ValidateRequiredFields;
