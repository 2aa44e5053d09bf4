//! Ambient process context
//!
//! Everything the overlay builder reads from its surroundings lives in an
//! [`AmbientContext`]: environment variables, server (request) variables,
//! the variables-order directive, loaded extensions and the installer flag.
//! Environment exports made during a build are recorded here as well, so a
//! build never mutates the real process environment.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Default variables-order directive: every source populated
pub const DEFAULT_VARIABLES_ORDER: &str = "EGPCS";

/// Explicit environment override read by [`crate::domain::Environment::detect`]
pub const ENV_SITE_ENVIRONMENT: &str = "SITE_ENVIRONMENT";

/// Explicit platform override read by [`crate::domain::Platform::detect`]
pub const ENV_SITE_PLATFORM: &str = "SITE_PLATFORM";

/// Snapshot of the process context consumed by the builder
#[derive(Clone)]
pub struct AmbientContext {
    env: BTreeMap<String, String>,
    server: BTreeMap<String, String>,
    variables_order: String,
    extensions: BTreeSet<String>,
    installing: bool,
    exports: BTreeMap<String, String>,
}

impl AmbientContext {
    /// Creates an empty context with every variable source populated
    pub fn new() -> Self {
        Self {
            env: BTreeMap::new(),
            server: BTreeMap::new(),
            variables_order: DEFAULT_VARIABLES_ORDER.to_string(),
            extensions: BTreeSet::new(),
            installing: false,
            exports: BTreeMap::new(),
        }
    }

    /// Captures the current process environment
    ///
    /// Server variables mirror the environment, as a CGI host would expose
    /// them.
    pub fn from_process() -> Self {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Self {
            server: env.clone(),
            env,
            ..Self::new()
        }
    }

    /// Adds an environment variable
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Adds a server variable
    pub fn with_server(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(name.into(), value.into());
        self
    }

    /// Sets the variables-order directive
    pub fn with_variables_order(mut self, order: impl Into<String>) -> Self {
        self.variables_order = order.into();
        self
    }

    /// Marks an extension as loaded
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(name.into().to_lowercase());
        self
    }

    /// Marks the framework as mid-installation
    pub fn with_installing(mut self, installing: bool) -> Self {
        self.installing = installing;
        self
    }

    /// True when the variables-order directive includes `E`
    pub fn env_populated(&self) -> bool {
        self.variables_order.to_ascii_uppercase().contains('E')
    }

    /// The variables-order directive
    pub fn variables_order(&self) -> &str {
        &self.variables_order
    }

    /// Reads an environment variable
    ///
    /// Always `None` when the environment was not populated.
    pub fn env(&self, name: &str) -> Option<&str> {
        if !self.env_populated() {
            return None;
        }
        self.env.get(name).map(String::as_str)
    }

    /// Reads a server variable
    pub fn server(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str)
    }

    /// Reads an environment variable, falling back to the server context
    pub fn var(&self, name: &str) -> Option<&str> {
        self.env(name).or_else(|| self.server(name))
    }

    /// Like [`AmbientContext::var`], treating empty values as absent
    pub fn non_empty_var(&self, name: &str) -> Option<&str> {
        self.var(name).filter(|value| !value.is_empty())
    }

    /// Returns true when the extension was reported as loaded
    pub fn extension_loaded(&self, name: &str) -> bool {
        self.extensions.contains(&name.to_lowercase())
    }

    /// Returns true while the framework installer is running
    pub fn installing(&self) -> bool {
        self.installing
    }

    /// Exports a variable into the environment seen by later reads
    pub fn set_env(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        self.env.insert(name.clone(), value.clone());
        self.exports.insert(name, value);
    }

    /// Variables exported so far, in name order
    pub fn exports(&self) -> &BTreeMap<String, String> {
        &self.exports
    }

    /// Home directory from `HOME`
    pub fn home(&self) -> Option<&str> {
        self.non_empty_var("HOME")
    }
}

impl Default for AmbientContext {
    fn default() -> Self {
        Self::new()
    }
}

// Values may hold credentials; only names are printed.
impl fmt::Debug for AmbientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientContext")
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("server", &self.server.keys().collect::<Vec<_>>())
            .field("variables_order", &self.variables_order)
            .field("extensions", &self.extensions)
            .field("installing", &self.installing)
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_hidden_without_e() {
        let ctx = AmbientContext::new()
            .with_env("AH_SITE_GROUP", "acme")
            .with_variables_order("GPCS");

        assert!(!ctx.env_populated());
        assert_eq!(ctx.env("AH_SITE_GROUP"), None);
    }

    #[test]
    fn test_variables_order_case_insensitive() {
        let ctx = AmbientContext::new().with_variables_order("gpcse");
        assert!(ctx.env_populated());
    }

    #[test]
    fn test_var_falls_back_to_server() {
        let ctx = AmbientContext::new()
            .with_variables_order("GPCS")
            .with_server("PANTHEON_ENVIRONMENT", "dev");

        assert_eq!(ctx.var("PANTHEON_ENVIRONMENT"), Some("dev"));
    }

    #[test]
    fn test_set_env_records_export() {
        let mut ctx = AmbientContext::new();
        ctx.set_env("SOLR_HOST", "index");

        assert_eq!(ctx.env("SOLR_HOST"), Some("index"));
        assert_eq!(ctx.exports().get("SOLR_HOST").map(String::as_str), Some("index"));
    }

    #[test]
    fn test_non_empty_var() {
        let ctx = AmbientContext::new().with_env("HOME", "");
        assert_eq!(ctx.var("HOME"), Some(""));
        assert_eq!(ctx.home(), None);
    }

    #[test]
    fn test_extensions_case_insensitive() {
        let ctx = AmbientContext::new().with_extension("Redis");
        assert!(ctx.extension_loaded("redis"));
        assert!(!ctx.extension_loaded("apcu"));
    }

    #[test]
    fn test_debug_hides_values() {
        let ctx = AmbientContext::new().with_env("DB_PASSWORD", "hunter2");
        let debug_output = format!("{ctx:?}");
        assert!(debug_output.contains("DB_PASSWORD"));
        assert!(!debug_output.contains("hunter2"));
    }
}
