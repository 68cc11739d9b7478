//! CLI command handlers.

pub mod actions;
pub mod config;
pub mod delete;
pub mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chainproc_config::{ChainprocConfig, LoadedConfig};
use chainproc_core::{
    CatalogTranslator, ChainExecutor, InMemoryEntityStore, StaticAssociationResolver,
};
use chainproc_processors::ProcessorCatalog;
use serde::de::DeserializeOwned;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
    /// Resolved user config directory.
    pub config_dir: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    pub fn config(&self) -> &ChainprocConfig {
        &self.loaded.config
    }

    /// Association resolver seeded from `[[associations]]`.
    pub fn association_resolver(&self) -> StaticAssociationResolver {
        self.config()
            .associations
            .iter()
            .fold(StaticAssociationResolver::new(), |resolver, a| {
                resolver.with_targets(
                    a.owner.clone(),
                    a.join.as_deref(),
                    a.kind.clone(),
                    a.label.clone(),
                    a.targets.clone(),
                )
            })
    }

    /// Translator seeded from `[translations]`.
    pub fn translator(&self) -> CatalogTranslator {
        CatalogTranslator::from_messages(self.config().translations.clone())
    }

    /// Executor for every configured action, backed by `store`.
    pub fn executor(&self, store: &InMemoryEntityStore) -> Result<ChainExecutor> {
        let catalog = ProcessorCatalog::new(
            Arc::new(store.clone()),
            Arc::new(self.association_resolver()),
        );
        let registry = catalog.build_registry(&self.config().actions)?;
        Ok(ChainExecutor::new(registry))
    }
}

/// Read and deserialize a JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse input file '{}'", path.display()))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
