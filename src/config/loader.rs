//! Settings include files
//!
//! An include file is a data overlay that a site keeps next to its code
//! (`settings.local.toml`) or that a hosting platform drops on disk. It may
//! carry three optional top-level tables, each deep-merged into the matching
//! output map:
//!
//! ```toml
//! [settings]
//! file_private_path = "${APP_ROOT}/../private"
//!
//! [config."system.logging"]
//! error_level = "all"
//!
//! [databases.default.default]
//! host = "127.0.0.1"
//! port = 3306
//! database = "site"
//! username = "site"
//! password = "${DB_PASSWORD}"
//! ```
//!
//! Files ending in `.json` are parsed as JSON, everything else as TOML.
//! `${VAR}` placeholders are resolved before parsing.

use crate::config::ambient::AmbientContext;
use crate::domain::errors::SettingsError;
use crate::domain::result::Result;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Parsed contents of an include file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsInclude {
    /// Entries merged into the settings map
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Entries merged into the config map
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Connections merged into the database map
    #[serde(default)]
    pub databases: Map<String, Value>,
}

impl SettingsInclude {
    /// Returns true when the file carries no overrides
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty() && self.config.is_empty() && self.databases.is_empty()
    }
}

/// Loads an include file if it exists
///
/// Returns `Ok(None)` when there is no file at `path`.
///
/// Placeholders resolve first against `builtins`, then against the ambient
/// environment and server context.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a placeholder has no value,
/// or the contents do not parse.
pub fn load_include(
    path: impl AsRef<Path>,
    ambient: &AmbientContext,
    builtins: &[(&str, &str)],
) -> Result<Option<SettingsInclude>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| SettingsError::include(path.display(), format!("failed to read: {e}")))?;

    let contents = substitute_vars(&contents, |name| {
        builtins
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
            .or_else(|| ambient.var(name).map(str::to_string))
    })
    .map_err(|e| SettingsError::include(path.display(), e.to_string()))?;

    let include = if is_json(path) {
        serde_json::from_str(&contents)
            .map_err(|e| SettingsError::include(path.display(), format!("invalid JSON: {e}")))?
    } else {
        toml::from_str(&contents)
            .map_err(|e| SettingsError::include(path.display(), format!("invalid TOML: {e}")))?
    };

    Ok(Some(include))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes `${VAR_NAME}` placeholders
///
/// Comment lines (`#`) are copied untouched.
///
/// # Errors
///
/// Returns an error naming every placeholder `lookup` could not resolve.
fn substitute_vars<F>(input: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = placeholder().replace_all(line, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    if !missing_vars.iter().any(|v| v == name) {
                        missing_vars.push(name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SettingsError::Configuration(format!(
            "Missing variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}
