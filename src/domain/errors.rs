//! Domain error types
//!
//! This module defines the error hierarchy for site-settings. Only
//! [`SettingsError::Precondition`] ever escapes the builder; every other
//! variant is produced by a helper and downgraded to a log event by the
//! overlay that called it.

use thiserror::Error;

/// Main site-settings error type
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The host process did not populate the ambient environment
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A settings include file could not be applied
    #[error("Include error: {path}: {message}")]
    Include { path: String, message: String },

    /// Platform metadata was present but unusable
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Relationship credentials were missing or incomplete
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Rejection reasons for operator-supplied variable names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableParseError {
    /// A segment after the prefix is empty (`d8settings:` or `d8config::x`)
    #[error("empty segment in variable name '{0}'")]
    EmptySegment(String),

    /// More than prefix, key and one nested key
    #[error("too many segments in variable name '{0}'")]
    TooManySegments(String),

    /// Settings variables address a single top-level key
    #[error("settings variable '{0}' cannot address a nested key")]
    NestedSetting(String),

    /// Config variables need both an object name and a property
    #[error("config variable '{0}' is missing a property name")]
    MissingProperty(String),
}

impl SettingsError {
    /// Builds an include error for the given path
    pub fn include(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        SettingsError::Include {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SettingsError {
    fn from(err: toml::de::Error) -> Self {
        SettingsError::Configuration(format!("TOML parse error: {err}"))
    }
}
