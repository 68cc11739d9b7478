//! Mass delete handler.

use std::sync::Arc;

use chainproc_core::{
    AuthorizationChecker, Entity, EntityManager, EntityManagerRegistry, Translator,
};
use tracing::{debug, info, warn};

use crate::args::{MassDeleteArgs, ResultRecord};
use crate::deadline::Deadline;
use crate::error::{MassActionError, Result};
use crate::response::{DeleteLimit, MassActionResponse};
use crate::unit_of_work::UnitOfWork;

/// Translation key of the default success message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "grid.mass_action.delete.success_message";

/// Permission checked for every entity before removal.
pub const DELETE_PERMISSION: &str = "DELETE";

/// Default number of removals per commit.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Request method of a mass action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    /// Preview the limit.
    Post,
    /// Delete.
    Delete,
    /// Any other method, kept verbatim for the error message.
    Other(String),
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            _ => Self::Other(method.to_string()),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Other(method) => write!(f, "{}", method),
        }
    }
}

/// Deletes selected records in batches.
pub struct MassDeleteHandler {
    managers: Arc<dyn EntityManagerRegistry>,
    authorization: Arc<dyn AuthorizationChecker>,
    translator: Arc<dyn Translator>,
    batch_size: usize,
    max_limit: usize,
}

impl MassDeleteHandler {
    pub fn new(
        managers: Arc<dyn EntityManagerRegistry>,
        authorization: Arc<dyn AuthorizationChecker>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            managers,
            authorization,
            translator,
            batch_size: DEFAULT_BATCH_SIZE,
            max_limit: usize::MAX,
        }
    }

    /// Set the number of removals per commit.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the maximum number of records one request may delete.
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Limit preview for the selection.
    pub fn limit(&self, args: &MassDeleteArgs) -> DeleteLimit {
        DeleteLimit::new(args.records.len(), self.max_limit)
    }

    /// Dispatch on the request method.
    ///
    /// `POST` previews the limit, `DELETE` deletes within the limit and the
    /// deadline, anything else yields an unsuccessful response.
    pub fn handle(
        &self,
        method: impl Into<HttpMethod>,
        mut args: MassDeleteArgs,
        deadline: Deadline,
    ) -> Result<MassActionResponse> {
        let limit = self.limit(&args);
        match method.into() {
            HttpMethod::Post => Ok(limit.into()),
            HttpMethod::Delete => {
                args.records.truncate(limit.deletable);
                self.delete(&args, deadline)
            }
            HttpMethod::Other(method) => Ok(MassActionResponse::new(
                false,
                format!("Method \"{}\" is not supported", method),
            )),
        }
    }

    /// Delete every permitted record of `args`.
    ///
    /// Stops early once `deadline` passes; work staged so far is committed and
    /// the response carries `"truncated": true`.
    pub fn delete(&self, args: &MassDeleteArgs, deadline: Deadline) -> Result<MassActionResponse> {
        let entity_name = args
            .entity_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MassActionError::MissingEntityName(args.action_name.clone()))?;
        let identifier = args
            .identifier_column()
            .ok_or_else(|| MassActionError::MissingIdentifier(args.action_name.clone()))?;
        let manager = self
            .managers
            .manager_for_class(entity_name)
            .ok_or_else(|| MassActionError::NotManageable(entity_name.to_string()))?;

        let span = tracing::debug_span!(
            "mass_delete",
            action = %args.action_name,
            entity = entity_name
        );
        let _enter = span.enter();

        let mut uow = UnitOfWork::new(Arc::clone(&manager), self.batch_size);
        let mut truncated = false;
        let mut denied = 0usize;

        for (index, record) in args.records.iter().enumerate() {
            if deadline.is_expired() {
                warn!(
                    deleted = uow.staged(),
                    remaining = args.records.len() - index,
                    "deadline reached, stopping mass delete"
                );
                truncated = true;
                break;
            }

            let Some(entity) = self.resolve(record, entity_name, identifier, &manager)? else {
                continue;
            };
            if !self.authorization.is_granted(DELETE_PERMISSION, &entity) {
                debug!(id = ?entity.id, "delete not granted, skipping");
                denied += 1;
                continue;
            }
            uow.remove(&entity)?;
        }

        uow.finish()?;

        let count = uow.staged();
        info!(count, denied, commits = uow.commits(), truncated, "mass delete finished");

        let message_key = args
            .success_message
            .as_deref()
            .unwrap_or(DEFAULT_SUCCESS_MESSAGE);
        let message = self
            .translator
            .trans(message_key, &[("%count%", count.to_string())]);

        let mut response = MassActionResponse::new(count > 0, message).with_option("count", count);
        if truncated {
            response = response.with_option("truncated", true);
        }
        Ok(response)
    }

    /// The entity a record refers to: its root entity, else a reference
    /// loaded by identifier.
    fn resolve(
        &self,
        record: &ResultRecord,
        entity_name: &str,
        identifier: &str,
        manager: &Arc<dyn EntityManager>,
    ) -> Result<Option<Entity>> {
        if let Some(ref entity) = record.root_entity {
            return Ok(Some(entity.clone()));
        }
        match record.value(identifier) {
            Some(id) if !id.is_null() => Ok(manager.reference(entity_name, id)?),
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for MassDeleteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MassDeleteHandler")
            .field("batch_size", &self.batch_size)
            .field("max_limit", &self.max_limit)
            .finish_non_exhaustive()
    }
}
