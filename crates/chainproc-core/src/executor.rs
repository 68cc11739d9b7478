//! Chain executor.
//!
//! Runs the processors registered for an action against one [`Context`]:
//!
//! ```text
//! Ready ──► Running ──► Completed
//!              │
//!              └──────► Aborted
//! ```
//!
//! - **Ready**: processors resolved, ordered and filtered by condition.
//! - **Running**: one processor at a time. Processors that require a clean
//!   context are skipped once errors are recorded.
//! - **Completed**: every selected processor ran or was skipped.
//! - **Aborted**: a processor returned an [`Abort`](crate::Abort); nothing
//!   after it runs. Effects applied by earlier processors stand.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::error::{ChainError, Result};
use crate::registry::ProcessorRegistry;

/// Lifecycle state of a chain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    /// Processors resolved, nothing run yet.
    Ready,
    /// Processors are being executed.
    Running,
    /// All selected processors ran to completion.
    Completed,
    /// A processor aborted the chain.
    Aborted,
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainState::Ready => write!(f, "ready"),
            ChainState::Running => write!(f, "running"),
            ChainState::Completed => write!(f, "completed"),
            ChainState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Summary of a completed chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Action that was executed.
    pub action: String,
    /// Final state (always `Completed` for a returned report).
    pub state: ChainState,
    /// Names of processors that ran, in order.
    pub executed: Vec<String>,
    /// Names of processors skipped because the context held errors.
    pub skipped: Vec<String>,
}

impl ExecutionReport {
    fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            state: ChainState::Ready,
            executed: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Executes action chains from a shared [`ProcessorRegistry`].
///
/// The executor holds no per-run state, so one instance can serve many
/// contexts concurrently from different threads.
#[derive(Debug, Clone)]
pub struct ChainExecutor {
    registry: Arc<ProcessorRegistry>,
}

impl ChainExecutor {
    /// Create an executor owning the registry.
    pub fn new(registry: ProcessorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Create an executor over a shared registry.
    pub fn from_arc(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Run the chain for `action` and return the finalized context.
    pub fn execute(&self, action: &str, mut context: Context) -> Result<Context> {
        self.process(action, &mut context)?;
        Ok(context)
    }

    /// Run the chain for `action` against a borrowed context.
    ///
    /// On abort the context keeps whatever earlier processors did to it.
    pub fn process(&self, action: &str, context: &mut Context) -> Result<ExecutionReport> {
        let span = tracing::debug_span!(
            "chain",
            action,
            operation_id = %context.operation_id()
        );
        let _enter = span.enter();

        let processors = self
            .registry
            .resolve(action, context)
            .ok_or_else(|| ChainError::UnknownAction(action.to_string()))?;

        let mut report = ExecutionReport::new(action);
        debug!(processors = processors.len(), state = %report.state, "chain resolved");
        report.state = ChainState::Running;

        for processor in processors {
            let name = processor.name();

            if processor.requires_clean_context() && context.has_errors() {
                debug!(
                    processor = name,
                    errors = context.errors().len(),
                    "skipping processor, context has recorded errors"
                );
                report.skipped.push(name.to_string());
                continue;
            }

            trace!(processor = name, "running processor");
            if let Err(abort) = processor.process(context) {
                report.state = ChainState::Aborted;
                warn!(
                    processor = name,
                    error = %abort,
                    executed = report.executed.len(),
                    state = %report.state,
                    "chain aborted"
                );
                return Err(ChainError::Aborted {
                    action: action.to_string(),
                    processor: name.to_string(),
                    source: abort,
                });
            }
            report.executed.push(name.to_string());
        }

        report.state = ChainState::Completed;
        debug!(
            executed = report.executed.len(),
            skipped = report.skipped.len(),
            errors = context.errors().len(),
            state = %report.state,
            "chain completed"
        );
        Ok(report)
    }
}
