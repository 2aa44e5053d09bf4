//! Lando service metadata
//!
//! Lando publishes its services as JSON in `LANDO_INFO`. Only the
//! `database` and `index` services matter here, and their shapes differ
//! between Lando releases:
//! - `creds` is an object or a list of objects (the first one wins)
//! - the database name is `creds.database` or `creds.path`
//! - the search core is `index.core`, or the last segment of `index.path`
//! - ports are numbers or numeric strings

use crate::domain::database::DatabaseConnection;
use crate::domain::errors::SettingsError;
use crate::domain::result::Result;
use serde::Deserialize;
use serde_json::Value;

/// Parsed `LANDO_INFO` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandoInfo {
    #[serde(default)]
    pub database: Option<LandoService>,
    #[serde(default)]
    pub index: Option<LandoService>,
}

/// One Lando service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandoService {
    #[serde(default)]
    pub internal_connection: Option<InternalConnection>,
    #[serde(default)]
    pub creds: Option<LandoCredsField>,
    #[serde(default)]
    pub core: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Host and port inside the Lando network
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InternalConnection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Value,
}

impl InternalConnection {
    /// Port as a number, accepting numeric strings
    pub fn port(&self) -> Option<u16> {
        match &self.port {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// `creds` as a single object or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LandoCredsField {
    One(LandoCreds),
    Many(Vec<LandoCreds>),
}

impl LandoCredsField {
    /// The credentials in use
    pub fn first(&self) -> Option<&LandoCreds> {
        match self {
            LandoCredsField::One(creds) => Some(creds),
            LandoCredsField::Many(list) => list.first(),
        }
    }
}

/// Database credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandoCreds {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LandoCreds {
    /// Database name, falling back to `path`
    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref().or(self.path.as_deref())
    }
}

/// Search service location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    pub host: String,
    pub port: u16,
    pub core: String,
    pub path: String,
}

impl LandoInfo {
    /// Parses a `LANDO_INFO` payload
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object of services.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds the default database connection
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Metadata`] naming the first missing field.
    pub fn database_connection(&self) -> Result<DatabaseConnection> {
        let service = self
            .database
            .as_ref()
            .ok_or_else(|| missing("database service"))?;
        let connection = service
            .internal_connection
            .as_ref()
            .ok_or_else(|| missing("database.internal_connection"))?;
        let creds = service
            .creds
            .as_ref()
            .and_then(LandoCredsField::first)
            .ok_or_else(|| missing("database.creds"))?;

        let host = connection
            .host
            .as_deref()
            .ok_or_else(|| missing("database.internal_connection.host"))?;
        let port = connection
            .port()
            .ok_or_else(|| missing("database.internal_connection.port"))?;
        let database = creds
            .database_name()
            .ok_or_else(|| missing("database.creds.database"))?;
        let user = creds
            .user
            .as_deref()
            .ok_or_else(|| missing("database.creds.user"))?;
        let password = creds
            .password
            .as_deref()
            .ok_or_else(|| missing("database.creds.password"))?;

        Ok(DatabaseConnection::new(host, port, database, user, password))
    }

    /// Search service advertised as `index`, if complete
    pub fn search_index(&self) -> Option<SearchIndex> {
        let service = self.index.as_ref()?;
        let connection = service.internal_connection.as_ref()?;
        let host = connection.host.clone()?;
        let port = connection.port()?;

        let path = service.path.clone();
        let core = service.core.clone().or_else(|| {
            path.as_deref()
                .and_then(|p| p.trim_end_matches('/').rsplit('/').next())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
        })?;

        Some(SearchIndex {
            host,
            port,
            core,
            path: path.unwrap_or_else(|| "/".to_string()),
        })
    }
}

fn missing(field: &str) -> SettingsError {
    SettingsError::Metadata(format!("LANDO_INFO is missing {field}"))
}
