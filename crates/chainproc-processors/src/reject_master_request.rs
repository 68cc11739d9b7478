//! Gates an action to sub-requests only.

use chainproc_core::{Abort, Context, ProcessResult, Processor};
use tracing::debug;

/// Aborts with access denied when the context serves a master request.
///
/// Registered for resources that may only be created together with their
/// owner, e.g. an attachment embedded in the request that creates its email.
#[derive(Debug, Clone)]
pub struct RejectMasterRequest {
    message: String,
}

impl RejectMasterRequest {
    /// Catalog name.
    pub const NAME: &'static str = "reject_master_request";

    /// Message used when none is configured.
    pub const DEFAULT_MESSAGE: &'static str =
        "The action is available only as part of a request for its owner.";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The denial message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for RejectMasterRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MESSAGE)
    }
}

impl Processor for RejectMasterRequest {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, context: &mut Context) -> ProcessResult {
        if context.is_master_request() {
            debug!(class = ?context.class_name(), "master request rejected");
            return Err(Abort::AccessDenied(self.message.clone()));
        }
        Ok(())
    }
}
