//! Actions command - list configured chains.

use anyhow::Result;
use chainproc_core::InMemoryEntityStore;
use clap::Args;
use serde_json::json;

use super::{Context, print_json};

/// Arguments for the actions command.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Only show this action
    pub action: Option<String>,
}

/// Run the actions command.
pub fn run(args: ActionsArgs, ctx: &Context) -> Result<()> {
    let executor = ctx.executor(&InMemoryEntityStore::new())?;
    let registry = executor.registry();

    let actions: Vec<&str> = match args.action.as_deref() {
        Some(action) if registry.contains(action) => vec![action],
        Some(action) => anyhow::bail!("action '{}' is not configured", action),
        None => registry.actions(),
    };

    if ctx.json_output {
        let listing: Vec<_> = actions
            .iter()
            .map(|action| {
                let processors: Vec<_> = registry
                    .entries(action)
                    .iter()
                    .map(|e| {
                        json!({
                            "name": e.name(),
                            "priority": e.priority(),
                            "conditional": e.is_conditional(),
                        })
                    })
                    .collect();
                json!({ "action": action, "processors": processors })
            })
            .collect();
        return print_json(&listing);
    }

    if actions.is_empty() {
        println!("No actions configured");
        return Ok(());
    }

    for action in actions {
        println!("{}:", action);
        for entry in registry.entries(action) {
            let marker = if entry.is_conditional() { " (conditional)" } else { "" };
            println!("  {:>6}  {}{}", entry.priority(), entry.name(), marker);
        }
    }
    Ok(())
}
