//! Configuration management CLI commands.
//!
//! Provides `config path` and `config init`.

use std::path::Path;

use clap::Subcommand;
use scenegate::config::write_default_config;

use super::common::resolve_config_path;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand, PartialEq)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a config file populated with defaults
    Init,
}

/// Run a config subcommand.
pub fn run(config_path: Option<&Path>, command: ConfigCommands) -> Result<(), CliError> {
    let path = resolve_config_path(config_path)?;

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Init => {
            write_default_config(&path)?;
            println!("Created {}", path.display());
            println!("Set api_key in the [planet] section before running 'scenegate serve'.");
        }
    }

    Ok(())
}
