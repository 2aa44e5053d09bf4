//! Build command implementation
//!
//! Runs the full overlay build against the process environment and prints
//! the resulting maps, or the environment exports as shell statements.

use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::{AmbientContext, ToolConfig};
use crate::core::SettingsBuilder;
use crate::domain::{ConfigMap, DatabaseMap, SettingsError, SettingsMap};
use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;

/// Output format of the generated maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Framework application root (overrides site.app_root)
    #[arg(long)]
    pub app_root: Option<String>,

    /// Site directory relative to the application root (overrides site.site_path)
    #[arg(long)]
    pub site_path: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Print only the exported environment as `export` statements, for `eval`
    #[arg(long)]
    pub apply_env: bool,
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    settings: &'a SettingsMap,
    databases: &'a DatabaseMap,
    config: &'a ConfigMap,
}

impl BuildArgs {
    /// Execute the build command
    pub fn execute(&self, config: &ToolConfig) -> anyhow::Result<i32> {
        let app_root = self.app_root.as_deref().unwrap_or(&config.site.app_root);
        let site_path = self.site_path.as_deref().unwrap_or(&config.site.site_path);
        let ambient = config.ambient.apply(AmbientContext::from_process());

        tracing::info!(app_root, site_path, "Building settings");

        let builder = match SettingsBuilder::create(app_root, site_path, ambient) {
            Ok(builder) => builder,
            Err(e @ SettingsError::Precondition(_)) => {
                eprintln!("Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
            Err(e) => return Err(e).context("Failed to create settings builder"),
        };

        let builder = builder.with_defaults();
        let exports = builder.env_exports().clone();
        let (settings, databases, config) = builder.finalize();

        let output = BuildOutput {
            settings: &settings,
            databases: &databases,
            config: &config,
        };
        let rendered = self.render(&output, &exports)?;
        print!("{rendered}");
        Ok(0)
    }

    fn render(
        &self,
        output: &BuildOutput<'_>,
        exports: &BTreeMap<String, String>,
    ) -> anyhow::Result<String> {
        if self.apply_env {
            return Ok(render_exports(exports));
        }

        let mut rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(output)
                .context("Failed to serialize maps as JSON")?,
            OutputFormat::Toml => {
                toml::to_string_pretty(output).context("Failed to serialize maps as TOML")?
            }
        };
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}

/// Renders exports as POSIX shell statements
pub fn render_exports(exports: &BTreeMap<String, String>) -> String {
    exports
        .iter()
        .map(|(name, value)| format!("export {name}={}\n", shell_quote(value)))
        .collect()
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
