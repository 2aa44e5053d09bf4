//! Configuration inputs for site-settings.
//!
//! # Overview
//!
//! - [`AmbientContext`] - explicit snapshot of environment and server
//!   variables, the variables-order directive, loaded extensions and the
//!   installer flag
//! - [`load_include`] - settings include files (`settings.local.toml`,
//!   platform-provided overlays) with `${VAR}` substitution
//! - [`ToolConfig`] - configuration of the `site-settings` binary
//! - [`SecretString`] - zeroizing wrapper for passwords
//!
//! # Example
//!
//! ```rust
//! use site_settings::config::AmbientContext;
//!
//! let ambient = AmbientContext::new()
//!     .with_env("AH_SITE_GROUP", "acme")
//!     .with_env("AH_SITE_ENVIRONMENT", "prod");
//! assert_eq!(ambient.env("AH_SITE_GROUP"), Some("acme"));
//! ```

pub mod ambient;
pub mod loader;
pub mod schema;
pub mod secret;

pub use ambient::AmbientContext;
pub use loader::{load_include, SettingsInclude};
pub use schema::{AmbientConfig, LoggingConfig, SiteConfig, ToolConfig};
pub use secret::{secret_string, SecretString, SecretValue};
