//! Result type alias for site-settings

use super::errors::SettingsError;

/// Result type alias for site-settings operations
///
/// # Examples
///
/// ```
/// use site_settings::domain::result::Result;
/// use site_settings::domain::errors::SettingsError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SettingsError::Metadata("LANDO_INFO has no database".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SettingsError>;
