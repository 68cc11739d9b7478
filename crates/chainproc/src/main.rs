//! chainproc - chained request processing from the command line
//!
//! Main entry point for the chainproc CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

mod commands;

use commands::{actions, config, delete, run};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// chainproc - run processor chains and mass deletes
#[derive(Parser)]
#[command(name = "chainproc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// User config directory (default: platform config dir)
    #[arg(long, global = true, env = "CHAINPROC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an action chain against a context read from a JSON file
    Run(run::RunArgs),

    /// List configured actions and their processor order
    Actions(actions::ActionsArgs),

    /// Mass delete records read from a JSON file
    Delete(delete::DeleteArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = chainproc_config::load_config_with_options(None, cli.config_dir.as_deref())
        .context("failed to load configuration")?;
    let config_dir = cli
        .config_dir
        .clone()
        .or_else(chainproc_config::user_config_dir);

    let logging = loaded.config.logging();
    let level = if cli.verbose { "debug" } else { logging.level.as_str() };
    let console_filter = format!(
        "chainproc={level},chainproc_core={level},chainproc_processors={level},chainproc_batch={level},chainproc_config={level},warn"
    );

    // Console (human-readable, stderr) + optional rotating JSON file
    let (file_layer, _guard) = if logging.file {
        let log_dir = config_dir
            .as_ref()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "chainproc.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "chainproc=trace,chainproc_core=trace,chainproc_processors=trace,chainproc_batch=trace,chainproc_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(console_filter)),
                ),
        )
        .with(file_layer)
        .init();

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    // Create context for commands
    let ctx = commands::Context {
        loaded,
        config_dir,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => run::run(args, &ctx),
        Commands::Actions(args) => actions::run(args, &ctx),
        Commands::Delete(args) => delete::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
