//! Check-include command implementation
//!
//! Loads a settings include file the way the builder would and reports
//! what it contributes.

use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::{load_include, AmbientContext, SettingsInclude, ToolConfig};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the check-include command
#[derive(Args, Debug)]
pub struct CheckIncludeArgs {
    /// Include file to load
    pub path: PathBuf,
}

impl CheckIncludeArgs {
    /// Execute the check-include command
    pub fn execute(&self, config: &ToolConfig) -> anyhow::Result<i32> {
        let ambient = config.ambient.apply(AmbientContext::from_process());
        let builtins = [
            ("APP_ROOT", config.site.app_root.as_str()),
            ("SITE_PATH", config.site.site_path.as_str()),
        ];

        tracing::info!(path = %self.path.display(), "Checking include");

        match load_include(&self.path, &ambient, &builtins) {
            Ok(Some(include)) => {
                println!("Include file: {}", self.path.display());
                print!("{}", summarize(&include));
                Ok(0)
            }
            Ok(None) => {
                println!("Include file not found: {}", self.path.display());
                Ok(EXIT_CONFIG_ERROR)
            }
            Err(e) => {
                println!("Include file is invalid");
                println!("   Error: {e}");
                Ok(EXIT_CONFIG_ERROR)
            }
        }
    }
}

/// One line per section, listing its top-level keys
pub fn summarize(include: &SettingsInclude) -> String {
    let section = |name: &str, keys: Vec<&String>| {
        let keys: Vec<&str> = keys.into_iter().map(String::as_str).collect();
        format!("  {name} ({}): {}\n", keys.len(), keys.join(", "))
    };

    [
        section("settings", include.settings.keys().collect()),
        section("config", include.config.keys().collect()),
        section("databases", include.databases.keys().collect()),
    ]
    .concat()
}
