//! Tool configuration schema
//!
//! The `site-settings` binary reads an optional TOML file describing where
//! the site lives, how to emulate the host runtime and how to log. Every
//! field has a default, so an empty file is valid.

use crate::config::ambient::{AmbientContext, DEFAULT_VARIABLES_ORDER};
use crate::domain::errors::SettingsError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration of the binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Site location
    #[serde(default)]
    pub site: SiteConfig,

    /// Host runtime emulation
    #[serde(default)]
    pub ambient: AmbientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ToolConfig {
    /// Loads the configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed or
    /// invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SettingsError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            SettingsError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ToolConfig = toml::from_str(&contents)?;
        config.validate().map_err(|e| {
            SettingsError::Configuration(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns the first invalid field
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.site.validate()?;
        self.ambient.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Site location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Framework application root (the web docroot)
    #[serde(default = "default_app_root")]
    pub app_root: String,

    /// Site directory relative to the application root
    #[serde(default = "default_site_path")]
    pub site_path: String,
}

impl SiteConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.app_root.trim().is_empty() {
            return Err("site.app_root cannot be empty".to_string());
        }
        if self.site_path.trim().is_empty() {
            return Err("site.site_path cannot be empty".to_string());
        }
        if Path::new(&self.site_path).is_absolute() {
            return Err(format!(
                "site.site_path must be relative to app_root, got '{}'",
                self.site_path
            ));
        }
        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            app_root: default_app_root(),
            site_path: default_site_path(),
        }
    }
}

/// Host runtime emulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Variables-order directive of the host runtime
    #[serde(default = "default_variables_order")]
    pub variables_order: String,

    /// Extensions reported as loaded
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Whether the framework installer is running
    #[serde(default)]
    pub installing: bool,
}

impl AmbientConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid = "EGPCS";
        if let Some(c) = self
            .variables_order
            .chars()
            .find(|c| !valid.contains(c.to_ascii_uppercase()))
        {
            return Err(format!(
                "ambient.variables_order contains '{c}'. Only E, G, P, C and S are allowed"
            ));
        }
        Ok(())
    }

    /// Applies this emulation to a captured context
    pub fn apply(&self, ambient: AmbientContext) -> AmbientContext {
        self.extensions.iter().fold(
            ambient
                .with_variables_order(self.variables_order.clone())
                .with_installing(self.installing),
            |ctx, ext| ctx.with_extension(ext.clone()),
        )
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            variables_order: default_variables_order(),
            extensions: Vec::new(),
            installing: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write JSON logs to rolling files
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// File rotation (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.rotation.as_str()) {
            return Err(format!(
                "Invalid logging.rotation '{}'. Must be one of: {}",
                self.rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.file_enabled && self.file_path.is_empty() {
            return Err("logging.file_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            file_path: default_log_path(),
            rotation: default_rotation(),
        }
    }
}

fn default_app_root() -> String {
    ".".to_string()
}

fn default_site_path() -> String {
    "sites/default".to_string()
}

fn default_variables_order() -> String {
    DEFAULT_VARIABLES_ORDER.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
