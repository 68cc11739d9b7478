//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use chainproc_config::{ChainprocConfig, PROJECT_CONFIG_FILE, USER_CONFIG_FILE};
use clap::{Args, Subcommand};

use super::{Context, print_json};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show the user configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./chainproc.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(ctx),
        ConfigCommand::Init { local } => cmd_init(ctx, local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let config = ctx.config();

    if ctx.json_output {
        return print_json(config);
    }

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("Config files: (none, using defaults)");
    } else {
        println!("Config files:");
        for path in sources {
            println!("  {}", path.display());
        }
    }
    println!();

    let mass_delete = config.mass_delete();
    println!("Mass delete:");
    println!("  batch_size: {}", mass_delete.batch_size);
    println!("  max_limit:  {}", mass_delete.max_limit);
    match mass_delete.deadline_secs {
        Some(secs) => println!("  deadline:   {}s", secs),
        None => println!("  deadline:   none"),
    }
    println!();

    if !config.actions.is_empty() {
        println!("Actions:");
        for (name, action) in &config.actions {
            println!("  {:<24} {} processor(s)", name, action.processors.len());
        }
        println!();
    }

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ! {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;

    println!("Config file search order (later overrides earlier):\n");
    for source in &loaded.sources {
        let status = if source.loaded { "loaded" } else { "not found" };
        println!("  [{}] {}", status, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'chainproc config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }
    Ok(())
}

fn user_config_file(ctx: &Context) -> Result<PathBuf> {
    ctx.config_dir
        .as_ref()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

fn cmd_path(ctx: &Context) -> Result<()> {
    println!("{}", user_config_file(ctx)?.display());
    Ok(())
}

const TEMPLATE: &str = r#"# chainproc configuration

[logging]
level = "info"
file = true

[mass_delete]
batch_size = 100
max_limit = 5000
# deadline_secs = 30

[actions.create]
processors = [
    { name = "validate_required_fields", priority = 10 },
    { name = "save_entity", priority = -10 },
]

[actions.update]
processors = [
    { name = "validate_required_fields", priority = 10 },
    { name = "save_entity", priority = -10 },
]

[actions.customize_loaded_data]
processors = [
    { name = "build_extended_associations" },
]

# [[associations]]
# owner = "Acme\\Note"
# kind = "manyToOne"
# label = "activity"
# targets = { "Acme\\Account" = "account", "Acme\\Contact" = "contact" }

[translations]
"grid.mass_action.delete.success_message" = "%count% entities have been deleted successfully"
"#;

fn cmd_init(ctx: &Context, local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(PROJECT_CONFIG_FILE)
    } else {
        let path = user_config_file(ctx)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        path
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    // The template must stay loadable.
    ChainprocConfig::from_toml(TEMPLATE)?.validate()?;

    std::fs::write(&path, TEMPLATE)?;
    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  chainproc config show     # verify configuration");
    println!("  chainproc actions         # list processor chains");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let config = ChainprocConfig::from_toml(TEMPLATE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.actions.len(), 3);
        assert_eq!(config.mass_delete().batch_size, 100);
        assert!(config.translations.contains_key("grid.mass_action.delete.success_message"));
    }
}
