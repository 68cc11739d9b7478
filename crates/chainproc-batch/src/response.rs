//! Mass action response.

use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome reported back to the caller of a mass action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassActionResponse {
    pub successful: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl MassActionResponse {
    pub fn new(successful: bool, message: impl Into<String>) -> Self {
        Self {
            successful,
            message: message.into(),
            options: Map::new(),
        }
    }

    /// Add an option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// An option value.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// Preview of how many selected records a delete would touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteLimit {
    pub selected: usize,
    pub deletable: usize,
    pub max_limit: usize,
}

impl DeleteLimit {
    /// Limit for `selected` records under `max_limit`.
    pub fn new(selected: usize, max_limit: usize) -> Self {
        Self {
            selected,
            deletable: selected.min(max_limit),
            max_limit,
        }
    }

    /// Whether the selection exceeds the limit.
    pub fn is_truncating(&self) -> bool {
        self.selected > self.deletable
    }
}

impl From<DeleteLimit> for MassActionResponse {
    fn from(limit: DeleteLimit) -> Self {
        MassActionResponse::new(true, "OK")
            .with_option("selected", limit.selected)
            .with_option("deletable", limit.deletable)
            .with_option("max_limit", limit.max_limit)
    }
}
