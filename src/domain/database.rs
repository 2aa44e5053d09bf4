//! Database connection descriptors
//!
//! [`DatabaseMap`] maps a connection key to its replicas, each replica being
//! a [`DatabaseConnection`]. Only `default`/`default` is written by the
//! builder itself; platform payloads may add further connections.

use crate::config::{secret_string, SecretString};
use crate::domain::errors::SettingsError;
use crate::domain::maps::deep_merge;
use crate::domain::result::Result;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Connection and replica key used for the primary database
pub const DEFAULT_KEY: &str = "default";

/// Default database driver
pub const DEFAULT_DRIVER: &str = "mysql";

/// Default table collation
pub const DEFAULT_COLLATION: &str = "utf8mb4_general_ci";

/// A single database connection descriptor
///
/// Unknown fields (driver options such as `pdo` or `init_commands`) are kept
/// in `extra` and written back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConnection {
    pub database: String,
    pub username: String,
    pub password: SecretString,
    pub host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_collation")]
    pub collation: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatabaseConnection {
    /// Creates a descriptor with the default driver, prefix and collation
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            username: username.into(),
            password: secret_string(password.into()),
            host: host.into(),
            port,
            driver: default_driver(),
            prefix: String::new(),
            collation: default_collation(),
            extra: Map::new(),
        }
    }

    /// Overrides the driver
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Overrides the table prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Overrides the collation
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    /// True when host, port, database, username and password are all set
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty()
            && self.port != 0
            && !self.database.is_empty()
            && !self.username.is_empty()
            && !self.password.expose_secret().is_empty()
    }
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_collation() -> String {
    DEFAULT_COLLATION.to_string()
}

/// Accepts ports as numbers or numeric strings
pub(crate) fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Number(u16),
        Text(String),
    }

    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port '{text}'"))),
    }
}

/// Connection key → replica key → descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseMap(BTreeMap<String, BTreeMap<String, DatabaseConnection>>);

impl DatabaseMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `default`/`default`, if set
    pub fn default_connection(&self) -> Option<&DatabaseConnection> {
        self.get(DEFAULT_KEY, DEFAULT_KEY)
    }

    /// Replaces `default`/`default` wholesale
    pub fn set_default(&mut self, connection: DatabaseConnection) {
        self.insert(DEFAULT_KEY, DEFAULT_KEY, connection);
    }

    /// Returns the descriptor for a connection and replica
    pub fn get(&self, key: &str, replica: &str) -> Option<&DatabaseConnection> {
        self.0.get(key).and_then(|replicas| replicas.get(replica))
    }

    /// Inserts or replaces a descriptor
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        replica: impl Into<String>,
        connection: DatabaseConnection,
    ) {
        self.0
            .entry(key.into())
            .or_default()
            .insert(replica.into(), connection);
    }

    /// Connection keys in order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns true when no connections are defined
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merges a JSON payload of connections into this map
    ///
    /// Existing connections survive unless the payload names them; named
    /// fields of an existing descriptor are overwritten individually. The
    /// map is left unchanged when the merged result is not a valid set of
    /// descriptors.
    pub fn merge_json(&mut self, payload: Value) -> Result<()> {
        if !payload.is_object() {
            return Err(SettingsError::Configuration(
                "databases payload must be an object".to_string(),
            ));
        }

        let current = self.to_json()?;
        let merged = deep_merge(current, payload);
        *self = serde_json::from_value(merged)?;
        Ok(())
    }

    /// Serializes the map, exposing passwords
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
