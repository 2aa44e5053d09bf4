// site-settings - Hosting-aware settings builder for Drupal sites
// Copyright (c) 2025 Site Settings Contributors
// Licensed under the MIT License

//! # site-settings - Hosting-aware settings for Drupal sites
//!
//! site-settings computes the three maps a Drupal site reads at bootstrap
//! (settings, database connections and config overrides) from a sensible
//! baseline plus overlays for the detected environment and hosting platform.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** the hosting platform (Acquia, Platform.sh, Pantheon,
//!   Lando) and the environment tier (local, dev, staging, prod)
//! - **Layering** baseline settings, environment overlays and one platform
//!   overlay into owned maps
//! - **Reading** platform metadata: `PLATFORM_*` relationships, `LANDO_INFO`,
//!   `PRESSFLOW_SETTINGS`, provisioned include files
//! - **Importing** operator variables such as `d8config:system.site:name`
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The overlay builder and overlay table
//! - [`adapters`] - Platform metadata readers (Platform.sh, Lando)
//! - [`domain`] - Maps, detection enums and error types
//! - [`config`] - Ambient context, include files and tool configuration
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use site_settings::config::AmbientContext;
//! use site_settings::core::SettingsBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (settings, databases, config) =
//!         SettingsBuilder::create("/app/web", "sites/default", AmbientContext::from_process())?
//!             .with_defaults()
//!             .finalize();
//!
//!     println!("{}", serde_json::to_string_pretty(&settings)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Only a missing environment is an error:
//!
//! ```rust
//! use site_settings::config::AmbientContext;
//! use site_settings::core::SettingsBuilder;
//! use site_settings::domain::SettingsError;
//!
//! let ambient = AmbientContext::new().with_variables_order("GPCS");
//! let result = SettingsBuilder::create("/app/web", "sites/default", ambient);
//! assert!(matches!(result, Err(SettingsError::Precondition(_))));
//! ```
//!
//! Missing or malformed platform metadata is logged through `tracing` and
//! skipped.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
