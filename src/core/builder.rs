//! The settings overlay builder
//!
//! [`SettingsBuilder`] owns the three output maps from construction until
//! [`SettingsBuilder::finalize`]. Every `with_*` method consumes and returns
//! the builder, so a bootstrap reads as one chain:
//!
//! ```rust,no_run
//! use site_settings::config::AmbientContext;
//! use site_settings::core::SettingsBuilder;
//!
//! # fn example() -> site_settings::domain::Result<()> {
//! let (settings, databases, config) =
//!     SettingsBuilder::create("/app/web", "sites/default", AmbientContext::from_process())?
//!         .with_defaults()
//!         .finalize();
//! # Ok(())
//! # }
//! ```

use crate::adapters::lando::LandoInfo;
use crate::adapters::platformsh::{PlatformConfigReader, PlatformShConfig};
use crate::config::ambient::AmbientContext;
use crate::config::loader::load_include;
use crate::config::SecretString;
use crate::core::overlays;
use crate::domain::database::{DatabaseConnection, DatabaseMap};
use crate::domain::environment::Environment;
use crate::domain::errors::SettingsError;
use crate::domain::maps::{ConfigMap, SettingsMap};
use crate::domain::platform::Platform;
use crate::domain::result::Result;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Pattern of paths the fast 404 handler must leave to the framework
pub const FAST_404_EXCLUDE_PATHS: &str = r"/\/(?:styles)|(?:system\/files)\//";

/// Pattern of file extensions answered by the fast 404 handler
pub const FAST_404_PATHS: &str =
    r"/\.(?:txt|png|gif|jpe?g|css|js|ico|swf|flv|cgi|bat|pl|dll|exe|asp)$/i";

/// Body served by the fast 404 handler
pub const FAST_404_HTML: &str = r#"<!DOCTYPE html><html><head><title>404 Not Found</title></head><body><h1>Not Found</h1><p>The requested URL "@path" was not found on this server.</p></body></html>"#;

/// Directories never scanned for extensions
pub const FILE_SCAN_IGNORE_DIRECTORIES: [&str; 2] = ["node_modules", "bower_components"];

/// Default temporary file path
pub const DEFAULT_TEMP_PATH: &str = "/tmp";

/// Local override file inside the site directory
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.toml";

/// Pantheon secrets file relative to `HOME`
pub const PANTHEON_SECRETS_FILE: &str = "files/private/secrets.json";

/// Builds the settings, database and config maps for one bootstrap
pub struct SettingsBuilder {
    app_root: PathBuf,
    site_path: PathBuf,
    settings: SettingsMap,
    databases: DatabaseMap,
    config: ConfigMap,
    environment: Environment,
    platform: Platform,
    ambient: AmbientContext,
    lando_info: Option<LandoInfo>,
    platform_reader: Option<Box<dyn PlatformConfigReader>>,
}

impl SettingsBuilder {
    /// Creates a builder for the site at `app_root/site_path`
    ///
    /// Detects the platform and environment, parses `LANDO_INFO` when
    /// present and instantiates the Platform.sh reader when its variables
    /// are present.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Precondition`] when the environment was not
    /// populated, unless the platform is Pantheon.
    pub fn create(
        app_root: impl Into<PathBuf>,
        site_path: impl Into<PathBuf>,
        ambient: AmbientContext,
    ) -> Result<Self> {
        let platform = Platform::detect(&ambient);

        if platform.requires_env() && !ambient.env_populated() {
            return Err(SettingsError::Precondition(format!(
                "Environment variables have not been populated. variables_order should include \"E\", got \"{}\"",
                ambient.variables_order()
            )));
        }

        let environment = Environment::detect(&ambient, platform);

        let lando_info = ambient
            .env("LANDO_INFO")
            .and_then(|raw| match LandoInfo::parse(raw) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed LANDO_INFO");
                    None
                }
            });

        let platform_reader = PlatformShConfig::from_ambient(&ambient)
            .map(|reader| Box::new(reader) as Box<dyn PlatformConfigReader>);

        tracing::info!(
            environment = %environment,
            platform = %platform,
            lando_info = lando_info.is_some(),
            platform_reader = platform_reader.is_some(),
            "Settings builder created"
        );

        Ok(Self {
            app_root: app_root.into(),
            site_path: site_path.into(),
            settings: SettingsMap::new(),
            databases: DatabaseMap::new(),
            config: ConfigMap::new(),
            environment,
            platform,
            ambient,
            lando_info,
            platform_reader,
        })
    }

    /// Replaces the Platform.sh reader
    pub fn with_platform_reader(mut self, reader: impl PlatformConfigReader + 'static) -> Self {
        self.platform_reader = Some(Box::new(reader));
        self
    }

    /// Applies the base layer, then the overlays selected for the detected
    /// environment and platform
    ///
    /// Call once: list-valued keys such as `container_yamls` grow on every
    /// call.
    pub fn with_defaults(mut self) -> Self {
        self.settings.set("update_free_access", false);
        self.settings.set("rebuild_access", false);
        self.settings.set("extension_discovery_scan_tests", false);
        self.settings.set("entity_update_batch_size", false);

        let services = self.site_file("services.yml");
        let config_sync = self.app_path("config");
        let private_path = self.app_path("files-private");

        let builder = self
            .add_container_yaml(services)
            .with_config_sync(config_sync)
            .with_file_scan_ignore_directories(&FILE_SCAN_IGNORE_DIRECTORIES)
            .with_private_file_path(private_path)
            .with_temp_file_path(DEFAULT_TEMP_PATH)
            .with_fast_404();

        overlays::overlays_for(builder.environment, builder.platform)
            .into_iter()
            .fold(builder, |builder, overlay| {
                tracing::debug!(overlay = overlay.name, "Applying overlay");
                (overlay.apply)(builder)
            })
    }

    /// Sets the fast 404 exclusion pattern, extension pattern and body
    pub fn with_fast_404(mut self) -> Self {
        for (key, value) in [
            ("exclude_paths", FAST_404_EXCLUDE_PATHS),
            ("paths", FAST_404_PATHS),
            ("html", FAST_404_HTML),
        ] {
            self.config
                .set_path(&["system.performance", "fast_404", key], value);
        }
        self
    }

    /// Replaces the default connection with the default driver, prefix and
    /// collation
    pub fn with_database(
        self,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.with_database_connection(DatabaseConnection::new(
            host, port, database, username, password,
        ))
    }

    /// Replaces the default connection wholesale
    pub fn with_database_connection(mut self, connection: DatabaseConnection) -> Self {
        tracing::debug!(
            host = %connection.host,
            port = connection.port,
            database = %connection.database,
            driver = %connection.driver,
            "Setting default database"
        );
        self.databases.set_default(connection);
        self
    }

    /// Switches the default cache backend to Redis
    ///
    /// A missing or blank password leaves the password key unset. Form
    /// cache stays on the database backend.
    pub fn with_redis(mut self, host: &str, port: u16, password: Option<&SecretString>) -> Self {
        let services = self.app_path("modules/contrib/redis/example.services.yml");
        self.settings.push("container_yamls", services);

        let connection = "redis.connection";
        self.settings.set_path(&[connection, "interface"], "PhpRedis");
        self.settings.set_path(&[connection, "host"], host);
        self.settings.set_path(&[connection, "port"], port);
        if let Some(password) = password.filter(|p| !p.expose_secret().is_empty()) {
            let password: &str = password.expose_secret().as_ref();
            self.settings.set_path(&[connection, "password"], password);
        }

        self.settings.set("redis_compress_length", 100);
        self.settings.set("redis_compress_level", 1);

        self.settings.set_path(&["cache", "default"], "cache.backend.redis");
        self.settings.set_path(&["cache_prefix", "default"], "drupal_");
        self.settings
            .set_path(&["cache", "bins", "form"], "cache.backend.database");

        tracing::debug!(host, port, "Redis cache backend enabled");
        self
    }

    /// Includes the local override file
    ///
    /// Defaults to `app_root/site_path/settings.local.toml`. A missing file
    /// is skipped.
    pub fn with_local_settings(self, path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(|| self.app_root.join(&self.site_path).join(LOCAL_SETTINGS_FILE));
        self.include_settings(path)
    }

    /// Exports the key/value pairs of a Pantheon secrets file into the
    /// ambient environment
    ///
    /// Defaults to `HOME/files/private/secrets.json`. A missing file is
    /// skipped; a malformed one is logged and skipped.
    pub fn with_pantheon_secrets(mut self, path: Option<PathBuf>) -> Self {
        let Some(path) = path.or_else(|| {
            self.ambient
                .home()
                .map(|home| Path::new(home).join(PANTHEON_SECRETS_FILE))
        }) else {
            tracing::debug!("No HOME; skipping secrets file");
            return self;
        };

        if !path.is_file() {
            tracing::debug!(path = %path.display(), "No secrets file");
            return self;
        }

        match read_secrets(&path) {
            Ok(secrets) => {
                let count = secrets.len();
                for (name, value) in secrets {
                    self.ambient.set_env(name, value);
                }
                tracing::info!(path = %path.display(), count, "Exported secrets");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed secrets file");
            }
        }
        self
    }

    /// Sets the config sync directory
    pub fn with_config_sync(mut self, path: impl Into<String>) -> Self {
        self.settings.set("config_sync_directory", path.into());
        self
    }

    /// Sets the private file path
    pub fn with_private_file_path(mut self, path: impl Into<String>) -> Self {
        self.settings.set("file_private_path", path.into());
        self
    }

    /// Sets the temporary file path
    pub fn with_temp_file_path(mut self, path: impl Into<String>) -> Self {
        self.settings.set("file_temp_path", path.into());
        self
    }

    /// Replaces the directories skipped by extension discovery
    pub fn with_file_scan_ignore_directories(mut self, directories: &[&str]) -> Self {
        self.settings
            .set("file_scan_ignore_directories", directories.to_vec());
        self
    }

    /// Appends a service definition file
    pub fn add_container_yaml(mut self, path: impl Into<String>) -> Self {
        self.settings.push("container_yamls", path.into());
        self
    }

    /// Merges an include file into the maps, if it exists
    ///
    /// `${APP_ROOT}` and `${SITE_PATH}` are available as placeholders.
    /// Unreadable or invalid files are logged and skipped.
    pub fn include_settings(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let app_root = self.app_root.to_string_lossy().into_owned();
        let site_path = self.site_path.to_string_lossy().into_owned();
        let builtins = [("APP_ROOT", app_root.as_str()), ("SITE_PATH", site_path.as_str())];

        let include = match load_include(path, &self.ambient, &builtins) {
            Ok(Some(include)) => include,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No settings include");
                return self;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping settings include");
                return self;
            }
        };

        if include.is_empty() {
            tracing::debug!(path = %path.display(), "Settings include carries no overrides");
            return self;
        }

        if !include.databases.is_empty() {
            if let Err(e) = self.databases.merge_json(Value::Object(include.databases)) {
                tracing::warn!(path = %path.display(), error = %e, "Skipping databases from settings include");
            }
        }
        self.settings.merge(include.settings);
        self.config.merge(include.config);

        tracing::info!(path = %path.display(), "Included settings");
        self
    }

    /// Hands the maps back
    pub fn finalize(self) -> (SettingsMap, DatabaseMap, ConfigMap) {
        tracing::info!(
            settings = self.settings.len(),
            config = self.config.len(),
            databases = self.databases.keys().count(),
            exports = self.ambient.exports().len(),
            "Settings finalized"
        );
        (self.settings, self.databases, self.config)
    }

    /// Detected environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Detected platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Settings written so far
    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Database connections written so far
    pub fn databases(&self) -> &DatabaseMap {
        &self.databases
    }

    /// Config overrides written so far
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    /// Ambient context, including exports made so far
    pub fn ambient(&self) -> &AmbientContext {
        &self.ambient
    }

    /// Environment variables exported during the build
    pub fn env_exports(&self) -> &BTreeMap<String, String> {
        self.ambient.exports()
    }

    /// `app_root/relative` as a string
    pub fn app_path(&self, relative: &str) -> String {
        self.app_root.join(relative).to_string_lossy().into_owned()
    }

    fn site_file(&self, file: &str) -> String {
        self.app_root
            .join(&self.site_path)
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    pub(crate) fn settings_mut(&mut self) -> &mut SettingsMap {
        &mut self.settings
    }

    pub(crate) fn config_mut(&mut self) -> &mut ConfigMap {
        &mut self.config
    }

    pub(crate) fn databases_mut(&mut self) -> &mut DatabaseMap {
        &mut self.databases
    }

    pub(crate) fn ambient_mut(&mut self) -> &mut AmbientContext {
        &mut self.ambient
    }

    pub(crate) fn lando_info(&self) -> Option<&LandoInfo> {
        self.lando_info.as_ref()
    }

    pub(crate) fn take_platform_reader(&mut self) -> Option<Box<dyn PlatformConfigReader>> {
        self.platform_reader.take()
    }

    pub(crate) fn restore_platform_reader(&mut self, reader: Box<dyn PlatformConfigReader>) {
        self.platform_reader = Some(reader);
    }
}

/// Reads a flat JSON object; non-string values are exported as JSON text
fn read_secrets(path: &Path) -> Result<Vec<(String, String)>> {
    let contents = fs::read_to_string(path)?;
    let secrets: Map<String, Value> = serde_json::from_str(&contents)?;
    Ok(secrets
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => (name, s),
            other => (name, other.to_string()),
        })
        .collect())
}
