//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for site-settings using clap.

pub mod commands;

use crate::config::ToolConfig;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "site-settings.toml";

/// Exit code for configuration and precondition errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;

/// site-settings - Hosting-aware settings builder
#[derive(Parser, Debug)]
#[command(name = "site-settings")]
#[command(version, about, long_about = None)]
#[command(author = "Site Settings Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SITE_SETTINGS_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SITE_SETTINGS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the settings, database and config maps
    Build(commands::build::BuildArgs),

    /// Show the detected platform and environment
    Detect(commands::detect::DetectArgs),

    /// Load a settings include file and summarize it
    CheckInclude(commands::check_include::CheckIncludeArgs),
}

/// Loads the tool configuration
///
/// An explicit path must exist. Without one, `site-settings.toml` in the
/// working directory is used when present, defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn load_tool_config(path: Option<&str>) -> crate::domain::Result<ToolConfig> {
    match path {
        Some(path) => ToolConfig::from_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => ToolConfig::from_file(DEFAULT_CONFIG_FILE),
        None => Ok(ToolConfig::default()),
    }
}
