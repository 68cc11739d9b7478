//! The mutable state threaded through one chain run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::definition::EntityDefinitionConfig;
use crate::entity::Payload;

/// Whether a context serves the outer request or a nested invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// The outer (top-level) request.
    #[default]
    Master,
    /// An embedded sub-request issued while handling another request.
    Sub,
}

/// A non-fatal finding recorded by a processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// Short human-readable message.
    pub title: String,
    /// Longer explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Path of the offending field, e.g. `owner.id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_path: Option<String>,
    /// HTTP-style status code equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl RecordedError {
    /// Create an error with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            property_path: None,
            status_code: None,
        }
    }

    /// Set the detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the property path.
    pub fn with_property_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = Some(path.into());
        self
    }

    /// Set the status code.
    pub fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }
}

impl std::fmt::Display for RecordedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.property_path, &self.detail) {
            (Some(path), Some(detail)) => write!(f, "{} ({}): {}", self.title, path, detail),
            (Some(path), None) => write!(f, "{} ({})", self.title, path),
            (None, Some(detail)) => write!(f, "{}: {}", self.title, detail),
            (None, None) => write!(f, "{}", self.title),
        }
    }
}

/// Request/response state for one logical operation.
///
/// A context is created per operation, passed by mutable reference through
/// every processor of the chain and discarded afterwards. It is never shared
/// between concurrently running chains.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    operation_id: Uuid,
    request_kind: RequestKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    join_class_name: Option<String>,
    #[serde(skip)]
    config: Option<EntityDefinitionConfig>,
    result: Option<Payload>,
    errors: Vec<RecordedError>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create an empty master-request context.
    pub fn new() -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            request_kind: RequestKind::Master,
            class_name: None,
            join_class_name: None,
            config: None,
            result: None,
            errors: Vec::new(),
        }
    }

    /// Build a context from a deserialized input document.
    pub fn from_input(input: ContextInput) -> Self {
        Self {
            request_kind: input.request,
            class_name: input.class_name,
            join_class_name: input.join_class_name,
            config: input.config,
            result: input.result,
            ..Self::new()
        }
    }

    /// Set the target class name.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the join class name used by association resolution.
    pub fn with_join_class_name(mut self, join_class_name: impl Into<String>) -> Self {
        self.join_class_name = Some(join_class_name.into());
        self
    }

    /// Set the field configuration.
    pub fn with_config(mut self, config: EntityDefinitionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the request kind.
    pub fn with_request_kind(mut self, kind: RequestKind) -> Self {
        self.request_kind = kind;
        self
    }

    /// Set the initial result.
    pub fn with_result(mut self, result: impl Into<Payload>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Unique id of this operation (used in log spans).
    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    // ── Metadata ────────────────────────────────────────────────────────

    /// Target class name.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Replace the target class name.
    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = Some(class_name.into());
    }

    /// Join class name, if the target is reached through one.
    pub fn join_class_name(&self) -> Option<&str> {
        self.join_class_name.as_deref()
    }

    /// Field configuration of the target class.
    pub fn config(&self) -> Option<&EntityDefinitionConfig> {
        self.config.as_ref()
    }

    /// Replace the field configuration.
    pub fn set_config(&mut self, config: EntityDefinitionConfig) {
        self.config = Some(config);
    }

    /// Request kind.
    pub fn request_kind(&self) -> RequestKind {
        self.request_kind
    }

    /// Whether this context serves the outer request.
    pub fn is_master_request(&self) -> bool {
        self.request_kind == RequestKind::Master
    }

    // ── Result ──────────────────────────────────────────────────────────

    /// Replace the result. Errors are left untouched.
    pub fn set_result(&mut self, result: impl Into<Payload>) {
        self.result = Some(result.into());
    }

    /// Current result, if any.
    pub fn result(&self) -> Option<&Payload> {
        self.result.as_ref()
    }

    /// Mutable access to the current result.
    pub fn result_mut(&mut self) -> Option<&mut Payload> {
        self.result.as_mut()
    }

    /// Take the result out, leaving the context without one.
    pub fn take_result(&mut self) -> Option<Payload> {
        self.result.take()
    }

    /// Drop the result.
    pub fn remove_result(&mut self) {
        self.result = None;
    }

    /// Whether a result is present, even if it is empty.
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    // ── Errors ──────────────────────────────────────────────────────────

    /// Record a non-fatal error. The result is not altered.
    pub fn add_error(&mut self, error: RecordedError) {
        self.errors.push(error);
    }

    /// Whether any error has been recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Recorded errors in insertion order.
    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }
}

/// Input document used to build a [`Context`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextInput {
    /// Target class name.
    #[serde(default)]
    pub class_name: Option<String>,
    /// Join class name for association resolution.
    #[serde(default)]
    pub join_class_name: Option<String>,
    /// Request kind, master by default.
    #[serde(default)]
    pub request: RequestKind,
    /// Field configuration.
    #[serde(default)]
    pub config: Option<EntityDefinitionConfig>,
    /// Initial result.
    #[serde(default)]
    pub result: Option<Payload>,
}
