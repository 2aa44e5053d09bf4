// site-settings - Hosting-aware settings builder for Drupal sites
// Copyright (c) 2025 Site Settings Contributors
// Licensed under the MIT License

use clap::Parser;
use site_settings::cli::{load_tool_config, Cli, Commands, EXIT_CONFIG_ERROR, EXIT_FATAL};
use site_settings::config::ToolConfig;
use site_settings::log_error_with_context;
use site_settings::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_tool_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let guard = match init_logging(log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "site-settings");

    let exit_code = match execute_command(&cli, &config) {
        Ok(code) => code,
        Err(e) => {
            log_error_with_context!(e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    drop(guard);
    process::exit(exit_code);
}

fn execute_command(cli: &Cli, config: &ToolConfig) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Build(args) => args.execute(config),
        Commands::Detect(args) => args.execute(config),
        Commands::CheckInclude(args) => args.execute(config),
    }
}
