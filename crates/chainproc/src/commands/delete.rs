//! Delete command - batched mass delete.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chainproc_batch::{DELETE_PERMISSION, Deadline, MassDeleteArgs, MassDeleteHandler};
use chainproc_core::{Entity, InMemoryEntityStore, StaticAuthorizationChecker};
use clap::Args;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::{Context, print_json, read_json};

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// JSON file with the mass action and the stored entities
    #[arg(short, long)]
    pub input: PathBuf,

    /// Request method: DELETE deletes, POST previews the limit
    #[arg(short, long, default_value = "DELETE")]
    pub method: String,

    /// Time budget in seconds (overrides [mass_delete] deadline_secs)
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

/// Input document of the delete command.
#[derive(Debug, Deserialize)]
struct DeleteInput {
    #[serde(flatten)]
    args: MassDeleteArgs,
    /// Entities present in the store before deleting.
    #[serde(default)]
    entities: Vec<Entity>,
    /// Identifiers the caller may not delete.
    #[serde(default)]
    denied: Vec<Value>,
}

/// Run the delete command.
pub fn run(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let input: DeleteInput = read_json(&args.input)?;
    let settings = ctx.config().mass_delete();

    let store = InMemoryEntityStore::new();
    for entity in input.entities {
        store.manage(entity.class.clone());
        store.insert(entity);
    }
    if let Some(ref class) = input.args.entity_name {
        store.manage(class.clone());
    }

    let mut authorization = StaticAuthorizationChecker::allow_all();
    if let Some(ref class) = input.args.entity_name {
        for id in &input.denied {
            authorization = authorization.deny_entity(DELETE_PERMISSION, class.clone(), id);
        }
    }

    let deadline = match args.deadline_secs.or(settings.deadline_secs) {
        Some(secs) => Deadline::after(Duration::from_secs(secs)),
        None => Deadline::unbounded(),
    };

    let handler = MassDeleteHandler::new(
        Arc::new(store.clone()),
        Arc::new(authorization),
        Arc::new(ctx.translator()),
    )
    .with_batch_size(settings.batch_size)
    .with_max_limit(settings.max_limit);

    let entity_name = input.args.entity_name.clone();
    let response = handler.handle(args.method.as_str(), input.args, deadline)?;
    let remaining = entity_name.as_deref().map_or(0, |class| store.count(class));
    info!(successful = response.successful, remaining, "mass action handled");

    if ctx.json_output {
        return print_json(&json!({ "response": response, "remaining": remaining }));
    }

    println!("{}", response.message);
    for (key, value) in &response.options {
        println!("  {}: {}", key, value);
    }
    println!("  remaining: {}", remaining);
    Ok(())
}
