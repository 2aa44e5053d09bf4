//! Domain models and types for site-settings.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Detection enums** ([`Environment`], [`Platform`])
//! - **Output maps** ([`SettingsMap`], [`ConfigMap`], [`DatabaseMap`])
//! - **Connection descriptors** ([`DatabaseConnection`])
//! - **Error types** ([`SettingsError`], [`VariableParseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Output maps
//!
//! Keys in settings and config maps are literal; nested values are
//! addressed with explicit path segments:
//!
//! ```rust
//! use site_settings::domain::SettingsMap;
//! use serde_json::json;
//!
//! let mut settings = SettingsMap::new();
//! settings.set_path(&["redis.connection", "host"], "redis");
//! assert_eq!(settings.get("redis.connection"), Some(&json!({"host": "redis"})));
//! ```

pub mod database;
pub mod environment;
pub mod errors;
pub mod maps;
pub mod platform;
pub mod result;

pub use database::{DatabaseConnection, DatabaseMap};
pub use environment::Environment;
pub use errors::{SettingsError, VariableParseError};
pub use maps::{deep_merge, ConfigMap, SettingsMap, ValueMap};
pub use platform::Platform;
pub use result::Result;
