//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console logs on stderr
//! - Configurable log levels, overridable through `RUST_LOG`
//! - JSON file logging with rotation
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the binary.
//!
//! # Example
//!
//! ```no_run
//! use site_settings::logging::init_logging;
//! use site_settings::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use site_settings::log_error_with_context;
/// use site_settings::domain::SettingsError;
///
/// let error = SettingsError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
