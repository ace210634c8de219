//! `rjq config` command - Configuration management
//!
//! Reads and edits the user configuration file. Command-line flags and
//! `RJQ_*` environment variables still override whatever is stored here.

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::Context;
use crate::core::config::VALID_KEYS;
use crate::core::{Config, ConfigError};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Set a configuration value in the user config file
    Set(SetArgs),

    /// Remove a configuration value from the user config file
    Unset(UnsetArgs),

    /// Show the path to the user config file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., currency, company)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, ctx: &Context) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, ctx),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if let Some(key) = &args.key {
        return match config.get(key).map_err(|e| miette::miette!("{}", e))? {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        let value = config.get(key).map_err(|e| miette::miette!("{}", e))?;
        print_config_value(key, value.as_deref());
    }
    println!(
        "  {}: {}",
        style("(data directory)").cyan(),
        style(ctx.data_dir.root().display()).yellow()
    );

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--data-dir, --log-level)");
    println!("  2. Environment variables (RJQ_DATA_DIR, RJQ_LOG_LEVEL)");
    println!("  3. User config file (see 'rjq config path')");
    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    let path = config_path()?;
    let mut config = read_existing(&path)?;
    config
        .set(&args.key, &args.value)
        .map_err(|e| miette::miette!("{}", e))?;
    config
        .write_file(&path)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Set {} {} {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow()
    );
    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let path = config_path()?;
    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut config = read_existing(&path)?;
    let previous = config.get(&args.key).map_err(|e| miette::miette!("{}", e))?;
    if previous.is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    config
        .unset(&args.key)
        .map_err(|e| miette::miette!("{}", e))?;
    config
        .write_file(&path)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Removed {} from config",
        style("✓").green(),
        style(&args.key).cyan()
    );
    Ok(())
}

fn run_path() -> Result<()> {
    let path = config_path()?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'rjq config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or(ConfigError::NoConfigDir)
        .map_err(|e| miette::miette!("{}", e))
}

fn read_existing(path: &std::path::Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::read_file(path).map_err(|e| miette::miette!("{}", e))
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
