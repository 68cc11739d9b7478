//! The processor capability.
//!
//! A [`Processor`] is a single unit of work run against a [`Context`]. It may
//! read or transform the result, call out to a collaborator, record errors,
//! or return an [`Abort`](crate::Abort) to stop the chain. Unmet
//! preconditions (no result, wrong shape, prior errors) are skip conditions
//! and return `Ok(())`.
//!
//! # Example
//!
//! ```rust,ignore
//! use chainproc_core::{Context, ProcessResult, Processor};
//!
//! struct Normalize;
//!
//! impl Processor for Normalize {
//!     fn name(&self) -> &str { "normalize" }
//!
//!     fn process(&self, context: &mut Context) -> ProcessResult {
//!         if let Some(map) = context.result_mut().and_then(|r| r.as_object_mut()) {
//!             map.retain(|_, v| !v.is_null());
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::context::Context;
use crate::error::ProcessResult;

/// A single unit of work in a chain.
pub trait Processor: Send + Sync {
    /// Name used in registration, logs and abort reports.
    fn name(&self) -> &str;

    /// Run against the context.
    fn process(&self, context: &mut Context) -> ProcessResult;

    /// Whether the processor performs side effects that must never happen once
    /// the context holds recorded errors. The executor skips such processors.
    fn requires_clean_context(&self) -> bool {
        false
    }
}

/// Type alias for the closure backing a [`FnProcessor`].
pub type ProcessFn = Arc<dyn Fn(&mut Context) -> ProcessResult + Send + Sync>;

/// A processor constructed at runtime from a closure.
#[derive(Clone)]
pub struct FnProcessor {
    name: String,
    requires_clean_context: bool,
    process_fn: ProcessFn,
}

impl FnProcessor {
    /// Create a processor from a closure.
    pub fn new<F>(name: impl Into<String>, process_fn: F) -> Self
    where
        F: Fn(&mut Context) -> ProcessResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            requires_clean_context: false,
            process_fn: Arc::new(process_fn),
        }
    }

    /// Mark the processor as requiring a context without recorded errors.
    pub fn requiring_clean_context(mut self) -> Self {
        self.requires_clean_context = true;
        self
    }
}

impl Processor for FnProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, context: &mut Context) -> ProcessResult {
        (self.process_fn)(context)
    }

    fn requires_clean_context(&self) -> bool {
        self.requires_clean_context
    }
}

impl std::fmt::Debug for FnProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProcessor")
            .field("name", &self.name)
            .field("requires_clean_context", &self.requires_clean_context)
            .finish()
    }
}
