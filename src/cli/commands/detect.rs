//! Detect command implementation

use crate::config::{AmbientContext, ToolConfig};
use crate::domain::{Environment, Platform};
use clap::Args;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {}

impl DetectArgs {
    /// Execute the detect command
    pub fn execute(&self, config: &ToolConfig) -> anyhow::Result<i32> {
        let ambient = config.ambient.apply(AmbientContext::from_process());
        let platform = Platform::detect(&ambient);
        let environment = Environment::detect(&ambient, platform);

        tracing::debug!(%platform, %environment, "Detected");

        println!("Platform:    {platform}");
        println!("Environment: {environment}");
        if platform.requires_env() && !ambient.env_populated() {
            println!(
                "Warning: variables_order \"{}\" does not populate the environment",
                ambient.variables_order()
            );
        }
        Ok(0)
    }
}
