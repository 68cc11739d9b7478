//! Configuration system for chainproc.
//!
//! Provides TOML-based configuration with:
//! - Named actions and their processor lists (`[actions.<name>]`)
//! - Static association targets (`[[associations]]`)
//! - Mass delete limits (`[mass_delete]`)
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, PROJECT_CONFIG_FILE, USER_CONFIG_FILE, load_config,
    load_config_file, load_config_with_options, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
