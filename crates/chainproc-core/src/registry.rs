//! Processor registration grouped by action.
//!
//! Each action ("create", "customize_loaded_data", ...) owns an ordered list
//! of entries. Higher priority runs first; entries with equal priority keep
//! their registration order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{Context, RequestKind};
use crate::processor::Processor;

/// Applicability predicate deciding whether an entry takes part in a run.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn(&Context) -> bool + Send + Sync>);

impl Condition {
    /// Create a condition from a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Matches contexts whose target class equals `class_name`.
    pub fn class_name(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::new(move |ctx| ctx.class_name() == Some(class_name.as_str()))
    }

    /// Matches contexts of the given request kind.
    pub fn request_kind(kind: RequestKind) -> Self {
        Self::new(move |ctx| ctx.request_kind() == kind)
    }

    /// Matches contexts that hold a result.
    pub fn has_result() -> Self {
        Self::new(Context::has_result)
    }

    /// Matches contexts whose result is an entity.
    pub fn result_is_entity() -> Self {
        Self::new(|ctx| ctx.result().and_then(|r| r.as_entity()).is_some())
    }

    /// Both conditions must match.
    pub fn and(self, other: Condition) -> Self {
        Self::new(move |ctx| self.matches(ctx) && other.matches(ctx))
    }

    /// Evaluate against a context.
    pub fn matches(&self, context: &Context) -> bool {
        (self.0)(context)
    }
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// A processor plus its ordering and applicability settings.
#[derive(Clone)]
pub struct Registration {
    processor: Arc<dyn Processor>,
    priority: i32,
    condition: Option<Condition>,
}

impl Registration {
    /// Register a processor with priority 0 and no condition.
    pub fn new<P: Processor + 'static>(processor: P) -> Self {
        Self::from_arc(Arc::new(processor))
    }

    /// Register a shared processor.
    pub fn from_arc(processor: Arc<dyn Processor>) -> Self {
        Self {
            processor,
            priority: 0,
            condition: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Only take part when `condition` matches. Repeated calls are combined.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }
}

/// A registered processor within one action group.
#[derive(Clone)]
pub struct ProcessorEntry {
    processor: Arc<dyn Processor>,
    priority: i32,
    sequence: usize,
    condition: Option<Condition>,
}

impl ProcessorEntry {
    /// The processor.
    pub fn processor(&self) -> &Arc<dyn Processor> {
        &self.processor
    }

    /// Processor name.
    pub fn name(&self) -> &str {
        self.processor.name()
    }

    /// Ordering priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the entry is conditional.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Whether the entry takes part in a run for `context`.
    pub fn applies_to(&self, context: &Context) -> bool {
        self.condition.as_ref().is_none_or(|c| c.matches(context))
    }
}

impl std::fmt::Debug for ProcessorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorEntry")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}

/// Registry of processors grouped by action name.
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    actions: HashMap<String, Vec<ProcessorEntry>>,
    next_sequence: usize,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor for an action with the given priority.
    pub fn register<P: Processor + 'static>(
        &mut self,
        action: impl Into<String>,
        processor: P,
        priority: i32,
    ) {
        self.add(action, Registration::new(processor).with_priority(priority));
    }

    /// Register a fully configured entry for an action.
    pub fn add(&mut self, action: impl Into<String>, registration: Registration) {
        let entry = ProcessorEntry {
            processor: registration.processor,
            priority: registration.priority,
            sequence: self.next_sequence,
            condition: registration.condition,
        };
        self.next_sequence += 1;

        let entries = self.actions.entry(action.into()).or_default();
        entries.push(entry);
        // stable: equal priorities keep registration order
        entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.sequence.cmp(&b.sequence))
        });
    }

    /// Whether any processor is registered for the action.
    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Entries of an action in execution order.
    pub fn entries(&self, action: &str) -> &[ProcessorEntry] {
        self.actions.get(action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of registered entries.
    pub fn len(&self) -> usize {
        self.actions.values().map(|v| v.len()).sum()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Processors of an action that apply to `context`, in execution order.
    ///
    /// Returns `None` when the action is unknown.
    pub fn resolve(&self, action: &str, context: &Context) -> Option<Vec<Arc<dyn Processor>>> {
        let entries = self.actions.get(action)?;
        Some(
            entries
                .iter()
                .filter(|entry| entry.applies_to(context))
                .map(|entry| Arc::clone(&entry.processor))
                .collect(),
        )
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("actions", &self.actions())
            .field("entries", &self.len())
            .finish()
    }
}
