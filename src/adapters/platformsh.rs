//! Platform.sh configuration reader
//!
//! Platform.sh describes the running application through `PLATFORM_*`
//! environment variables. Relationships (service credentials) and project
//! variables are base64-encoded JSON documents.

use crate::config::ambient::AmbientContext;
use crate::config::SecretString;
use crate::domain::database::deserialize_port;
use crate::domain::errors::SettingsError;
use crate::domain::result::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Read access to a Platform.sh-style environment description
///
/// The overlay builder only talks to this trait, so tests can substitute a
/// fixed description.
pub trait PlatformConfigReader {
    /// Git branch of the current environment, when known
    fn branch(&self) -> Option<&str>;

    /// True on a dedicated (non-shared) hosting tier
    fn on_dedicated(&self) -> bool;

    /// True when a relationship with this name is defined
    fn has_relationship(&self, name: &str) -> bool;

    /// Credentials of the first endpoint of a relationship
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Credentials`] when the relationship is not
    /// defined.
    fn credentials(&self, name: &str) -> Result<Credentials>;

    /// Operator-defined project variables
    fn variables(&self) -> &Map<String, Value>;

    /// True at runtime, false during the build phase
    fn in_runtime(&self) -> bool;

    /// Absolute path of the application directory
    fn app_dir(&self) -> Option<&str>;

    /// Hash of the deployed source tree
    fn tree_id(&self) -> Option<&str>;

    /// Stable per-project random value
    fn project_entropy(&self) -> Option<&str>;
}

/// Credentials of a relationship endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub query: Map<String, Value>,
}

/// Reader backed by `PLATFORM_*` variables
#[derive(Debug, Clone, Default)]
pub struct PlatformShConfig {
    branch: Option<String>,
    mode: Option<String>,
    environment: Option<String>,
    app_dir: Option<String>,
    tree_id: Option<String>,
    project_entropy: Option<String>,
    relationships: BTreeMap<String, Vec<Credentials>>,
    variables: Map<String, Value>,
}

impl PlatformShConfig {
    /// Builds a reader when the ambient context describes a Platform.sh
    /// application
    ///
    /// Returns `None` without `PLATFORM_APPLICATION_NAME`. Undecodable
    /// relationship or variable documents are logged and treated as empty.
    pub fn from_ambient(ambient: &AmbientContext) -> Option<Self> {
        ambient.env("PLATFORM_APPLICATION_NAME")?;

        let owned = |name: &str| ambient.env(name).map(str::to_string);

        let relationships = decode_document(ambient, "PLATFORM_RELATIONSHIPS").unwrap_or_default();
        let variables = decode_document(ambient, "PLATFORM_VARIABLES").unwrap_or_default();

        Some(Self {
            branch: owned("PLATFORM_BRANCH"),
            mode: owned("PLATFORM_MODE"),
            environment: owned("PLATFORM_ENVIRONMENT"),
            app_dir: owned("PLATFORM_APP_DIR"),
            tree_id: owned("PLATFORM_TREE_ID"),
            project_entropy: owned("PLATFORM_PROJECT_ENTROPY"),
            relationships,
            variables,
        })
    }
}

fn decode_document<T: DeserializeOwned>(ambient: &AmbientContext, name: &str) -> Option<T> {
    let encoded = ambient.env(name)?;
    match decode_base64_json(encoded) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!(variable = name, error = %e, "Ignoring undecodable platform document");
            None
        }
    }
}

/// Decodes a base64-encoded JSON document
pub fn decode_base64_json<T: DeserializeOwned>(encoded: &str) -> Result<T> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SettingsError::Metadata(format!("invalid base64: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl PlatformConfigReader for PlatformShConfig {
    fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    fn on_dedicated(&self) -> bool {
        self.mode.as_deref() == Some("enterprise")
    }

    fn has_relationship(&self, name: &str) -> bool {
        self.relationships
            .get(name)
            .is_some_and(|endpoints| !endpoints.is_empty())
    }

    fn credentials(&self, name: &str) -> Result<Credentials> {
        self.relationships
            .get(name)
            .and_then(|endpoints| endpoints.first())
            .cloned()
            .ok_or_else(|| {
                SettingsError::Credentials(format!("relationship '{name}' is not defined"))
            })
    }

    fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    fn in_runtime(&self) -> bool {
        self.environment.is_some()
    }

    fn app_dir(&self) -> Option<&str> {
        self.app_dir.as_deref()
    }

    fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    fn project_entropy(&self) -> Option<&str> {
        self.project_entropy.as_deref()
    }
}
