//! Run command - execute one action chain.

use std::path::PathBuf;

use anyhow::Result;
use chainproc_core::{
    ChainState, Context as ChainContext, ContextInput, Entity, InMemoryEntityStore, RequestKind,
};
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Context, print_json, read_json};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Action to execute (e.g. create, customize_loaded_data)
    pub action: String,

    /// JSON file describing the context
    #[arg(short, long)]
    pub input: PathBuf,

    /// Run as a sub-request instead of a master request
    #[arg(long)]
    pub sub_request: bool,
}

/// Input document of the run command.
#[derive(Debug, Deserialize)]
struct RunInput {
    #[serde(flatten)]
    context: ContextInput,
    /// Classes the in-memory store manages; defaults to the context class.
    #[serde(default)]
    manageable: Option<Vec<String>>,
    /// Entities stored before the chain runs.
    #[serde(default)]
    seed: Vec<Entity>,
}

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    action: &'a str,
    state: ChainState,
    executed: Vec<String>,
    skipped: Vec<String>,
    context: &'a ChainContext,
    stored: Vec<Entity>,
}

/// Run the run command.
pub fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let input: RunInput = read_json(&args.input)?;

    let store = InMemoryEntityStore::new();
    let manageable = input
        .manageable
        .unwrap_or_else(|| input.context.class_name.iter().cloned().collect());
    for class in &manageable {
        store.manage(class.clone());
    }
    for entity in input.seed {
        store.insert(entity);
    }

    let executor = ctx.executor(&store)?;
    let mut context = ChainContext::from_input(input.context);
    if args.sub_request {
        context = context.with_request_kind(RequestKind::Sub);
    }

    let report = executor.process(&args.action, &mut context)?;
    info!(
        action = %args.action,
        executed = report.executed.len(),
        errors = context.errors().len(),
        "chain finished"
    );

    let stored: Vec<Entity> = manageable
        .iter()
        .flat_map(|class| store.all(class))
        .collect();
    if ctx.json_output {
        return print_json(&RunOutput {
            action: &args.action,
            state: report.state,
            executed: report.executed,
            skipped: report.skipped,
            context: &context,
            stored,
        });
    }

    println!("action:   {}", args.action);
    println!("state:    {}", report.state);
    println!("executed: {}", report.executed.join(", "));
    if !report.skipped.is_empty() {
        println!("skipped:  {}", report.skipped.join(", "));
    }
    for error in context.errors() {
        println!("error:    {}", error);
    }
    println!("stored:   {}", stored.len());
    print_json(&context)
}
