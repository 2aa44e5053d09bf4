//! Project variable names
//!
//! Operators inject overrides through project variables named
//! `prefix:key` or `prefix:object:property`:
//!
//! | Name                               | Target                                  |
//! |------------------------------------|-----------------------------------------|
//! | `d8settings:skip_permissions_hardening` | settings key `skip_permissions_hardening` |
//! | `drupal:hash_salt`                 | settings key `hash_salt`                |
//! | `d8config:system.site:name`        | config `system.site` → `name`           |
//!
//! Names without a recognized prefix belong to someone else and are ignored.
//! Names with a recognized prefix but an unusable shape are rejected.

use crate::domain::errors::VariableParseError;

/// Prefixes addressing the settings map
pub const SETTINGS_PREFIXES: [&str; 2] = ["d8settings", "drupal"];

/// Prefix addressing the config map
pub const CONFIG_PREFIX: &str = "d8config";

const MAX_SEGMENTS: usize = 3;

/// Where a project variable is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableTarget {
    /// Top-level settings key
    Setting(String),
    /// Config object name followed by the property path inside it
    ConfigPath(String, Vec<String>),
}

impl VariableTarget {
    /// Full path of segments, starting with the top-level key
    pub fn path(&self) -> Vec<&str> {
        match self {
            VariableTarget::Setting(key) => vec![key.as_str()],
            VariableTarget::ConfigPath(object, properties) => std::iter::once(object.as_str())
                .chain(properties.iter().map(String::as_str))
                .collect(),
        }
    }
}

/// Parses a project variable name
///
/// Returns `Ok(None)` for names that are not addressed to the site.
///
/// # Errors
///
/// Returns a [`VariableParseError`] when a recognized name has an empty
/// segment, too many segments, a nested settings key, or a config object
/// without a property.
pub fn parse_variable_name(name: &str) -> Result<Option<VariableTarget>, VariableParseError> {
    let segments: Vec<&str> = name.split(':').collect();
    if segments.len() < 2 {
        return Ok(None);
    }

    let prefix = segments[0];
    let is_setting = SETTINGS_PREFIXES.contains(&prefix);
    if !is_setting && prefix != CONFIG_PREFIX {
        return Ok(None);
    }

    if segments.len() > MAX_SEGMENTS {
        return Err(VariableParseError::TooManySegments(name.to_string()));
    }
    if segments[1..].iter().any(|segment| segment.is_empty()) {
        return Err(VariableParseError::EmptySegment(name.to_string()));
    }

    if is_setting {
        if segments.len() == MAX_SEGMENTS {
            return Err(VariableParseError::NestedSetting(name.to_string()));
        }
        return Ok(Some(VariableTarget::Setting(segments[1].to_string())));
    }

    match segments.as_slice() {
        [_, object, property] => Ok(Some(VariableTarget::ConfigPath(
            object.to_string(),
            vec![property.to_string()],
        ))),
        _ => Err(VariableParseError::MissingProperty(name.to_string())),
    }
}
