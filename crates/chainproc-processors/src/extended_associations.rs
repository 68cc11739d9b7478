//! Computes the value of extended (multi-target) associations.
//!
//! A field declared as `association:<kind>:<label>` has no column of its own.
//! Its value is assembled from the per-target fields that the association
//! resolver maps to it:
//!
//! | kind                          | non-null inputs          | no inputs |
//! |-------------------------------|--------------------------|-----------|
//! | `manyToOne`, `oneToOne`       | first one, in map order  | `null`    |
//! | `manyToMany`, `oneToMany`     | every list element       | `[]`      |
//! | `multipleManyToOne`           | every value              | `[]`      |
//!
//! Each contribution is `{"__class__": <target class>, "id": <id>}`.

use std::str::FromStr;
use std::sync::Arc;

use chainproc_core::{
    Abort, AssociationResolver, AssociationTargets, Context, ExtendedAssociation, ProcessResult,
    Processor,
};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

/// Key carrying the target class in a computed association value.
pub const CLASS_KEY: &str = "__class__";

/// Key carrying the identifier in a computed association value.
pub const ID_KEY: &str = "id";

/// Shape of an extended association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    /// Single-valued; at most one target field is populated.
    ToOne,
    /// Collection-valued; every target field holds a list.
    ToMany,
    /// Several single-valued targets collected into a list.
    MultipleToOne,
}

impl FromStr for AssociationKind {
    type Err = Abort;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "manyToOne" | "oneToOne" => Ok(Self::ToOne),
            "manyToMany" | "oneToMany" => Ok(Self::ToMany),
            "multipleManyToOne" => Ok(Self::MultipleToOne),
            other => Err(Abort::UnsupportedAssociationKind(other.to_string())),
        }
    }
}

impl AssociationKind {
    /// Assemble the association value from the mapped target fields of `data`.
    pub fn build(self, targets: &AssociationTargets, data: &Map<String, Value>) -> Value {
        match self {
            Self::ToOne => targets
                .iter()
                .find_map(|(class, field)| {
                    data.get(field)
                        .filter(|v| !v.is_null())
                        .map(|v| reference(class, v))
                })
                .unwrap_or(Value::Null),
            Self::ToMany => Value::Array(
                targets
                    .iter()
                    .filter_map(|(class, field)| match data.get(field) {
                        Some(Value::Array(items)) => Some((class, items)),
                        _ => None,
                    })
                    .flat_map(|(class, items)| items.iter().map(move |item| reference(class, item)))
                    .collect(),
            ),
            Self::MultipleToOne => Value::Array(
                targets
                    .iter()
                    .filter_map(|(class, field)| {
                        data.get(field)
                            .filter(|v| !v.is_null())
                            .map(|v| reference(class, v))
                    })
                    .collect(),
            ),
        }
    }
}

/// `{"__class__": class, "id": id}` for an object carrying an `id`, or for a
/// bare identifier.
fn reference(class: &str, value: &Value) -> Value {
    let id = match value {
        Value::Object(map) => map.get(ID_KEY).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };
    json!({ CLASS_KEY: class, ID_KEY: id })
}

/// Fills extended association fields of a loaded data object.
///
/// Excluded fields and fields that already hold a non-null value are left
/// alone and never reach the resolver. An unsupported kind aborts before the
/// resolver is consulted, and leaves the result untouched.
pub struct BuildExtendedAssociations {
    resolver: Arc<dyn AssociationResolver>,
}

impl BuildExtendedAssociations {
    /// Catalog name.
    pub const NAME: &'static str = "build_extended_associations";

    pub fn new(resolver: Arc<dyn AssociationResolver>) -> Self {
        Self { resolver }
    }
}

impl std::fmt::Debug for BuildExtendedAssociations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildExtendedAssociations").finish_non_exhaustive()
    }
}

impl Processor for BuildExtendedAssociations {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&self, context: &mut Context) -> ProcessResult {
        let (Some(class_name), Some(config)) = (context.class_name(), context.config()) else {
            return Ok(());
        };
        let Some(data) = context.result().and_then(|r| r.as_object()) else {
            return Ok(());
        };
        let join_class = context.join_class_name();

        let mut computed = Vec::new();
        for (field_name, field) in config.fields() {
            if field.excluded || data.get(field_name).is_some_and(|v| !v.is_null()) {
                continue;
            }
            let Some(ExtendedAssociation { kind, target_label }) = field.extended_association()?
            else {
                continue;
            };

            let association_kind: AssociationKind = kind.parse()?;
            let targets =
                self.resolver
                    .association_targets(class_name, join_class, &kind, &target_label);
            trace!(
                field = %field_name,
                kind = %kind,
                targets = targets.len(),
                "resolved association targets"
            );

            computed.push((
                field_name.to_string(),
                association_kind.build(&targets, data),
            ));
        }

        if computed.is_empty() {
            return Ok(());
        }

        debug!(count = computed.len(), "extended associations built");
        if let Some(data) = context.result_mut().and_then(|r| r.as_object_mut()) {
            data.extend(computed);
        }

        Ok(())
    }
}
