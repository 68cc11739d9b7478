//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [logging]                # console level, rolling file logs
//! [mass_delete]            # batch size, limit, deadline
//! [actions.create]         # processors of one action
//! [[associations]]         # static association targets
//! [translations]           # message catalog
//! ```

use std::collections::BTreeMap;

use chainproc_core::RequestKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Flush every this many deleted records unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on records a single mass delete may touch.
pub const DEFAULT_MAX_LIMIT: usize = 5000;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainprocConfig {
    /// Logging configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Mass delete configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_delete: Option<MassDeleteConfig>,

    /// Actions by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, ActionConfig>,

    /// Static association targets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationConfig>,

    /// Translation catalog, message key to template.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,
}

impl ChainprocConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Actions and translations are replaced per key; associations are
    /// appended.
    pub fn merge(&mut self, other: ChainprocConfig) {
        if other.logging.is_some() {
            self.logging = other.logging;
        }

        if other.mass_delete.is_some() {
            self.mass_delete = other.mass_delete;
        }

        for (name, action) in other.actions {
            self.actions.insert(name, action);
        }

        self.associations.extend(other.associations);

        for (key, template) in other.translations {
            self.translations.insert(key, template);
        }
    }

    /// Reject values that would make the pipeline unusable.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref mass_delete) = self.mass_delete
            && mass_delete.batch_size == 0
        {
            return Err(ConfigError::Invalid {
                field: "mass_delete.batch_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        for (action, config) in &self.actions {
            if let Some(p) = config.processors.iter().find(|p| p.name.is_empty()) {
                return Err(ConfigError::Invalid {
                    field: format!("actions.{}.processors", action),
                    reason: format!("processor at priority {} has no name", p.priority),
                });
            }
        }

        for (i, association) in self.associations.iter().enumerate() {
            if association.owner.is_empty() || association.kind.is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("associations[{}]", i),
                    reason: "owner and kind are required".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Logging settings, defaults when the section is absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Mass delete settings, defaults when the section is absent.
    pub fn mass_delete(&self) -> MassDeleteConfig {
        self.mass_delete.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Whether JSON logs are written to the config directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mass Delete Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Mass delete settings.
///
/// ```toml
/// [mass_delete]
/// batch_size = 100
/// max_limit = 5000
/// deadline_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassDeleteConfig {
    /// Records removed between two commits.
    pub batch_size: usize,
    /// Maximum number of records a single request may delete.
    pub max_limit: usize,
    /// Time budget in seconds; absent means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for MassDeleteConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_limit: DEFAULT_MAX_LIMIT,
            deadline_secs: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Action Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Processors registered for one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub processors: Vec<ProcessorConfig>,
}

/// One processor registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Catalog name, e.g. `save_entity`.
    pub name: String,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i32,
    /// Only run for contexts targeting this class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Only run for this request kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestKind>,
    /// Message used by gating processors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProcessorConfig {
    /// Create a registration with priority 0 and no conditions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            class: None,
            request: None,
            message: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restrict to a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Restrict to a request kind.
    pub fn with_request(mut self, request: RequestKind) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the gating message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Association Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Targets of one computed association.
///
/// ```toml
/// [[associations]]
/// owner = "Acme\\Note"
/// kind = "manyToOne"
/// label = "activity"
/// targets = { "Acme\\Account" = "account", "Acme\\Contact" = "contact" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationConfig {
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,
    pub kind: String,
    pub label: String,
    /// Target class to result field, in declaration order.
    #[serde(default)]
    pub targets: IndexMap<String, String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
