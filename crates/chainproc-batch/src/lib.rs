//! Batched mass delete.
//!
//! [`MassDeleteHandler`] removes a selection of records through the entity
//! manager of their class, checking the `DELETE` permission per entity and
//! committing the session every `batch_size` removals:
//!
//! ```text
//! records ─► resolve entity ─► is_granted? ─► remove ─┬─► (batch full) flush + clear
//!                                                     └─► (end) flush + clear trailing batch
//! ```
//!
//! A [`Deadline`] bounds long runs; work staged before it passes is kept.

pub mod args;
pub mod deadline;
pub mod error;
pub mod handler;
pub mod response;
pub mod unit_of_work;

pub use args::{MassDeleteArgs, ResultRecord};
pub use deadline::Deadline;
pub use error::{MassActionError, Result};
pub use handler::{
    DEFAULT_BATCH_SIZE, DEFAULT_SUCCESS_MESSAGE, DELETE_PERMISSION, HttpMethod, MassDeleteHandler,
};
pub use response::{DeleteLimit, MassActionResponse};
pub use unit_of_work::UnitOfWork;
