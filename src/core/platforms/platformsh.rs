//! Platform.sh overlay
//!
//! Reads relationships, branch and runtime paths through a
//! [`PlatformConfigReader`], then imports operator variables.

use crate::adapters::platformsh::{Credentials, PlatformConfigReader};
use crate::core::builder::SettingsBuilder;
use crate::core::variables::{parse_variable_name, VariableTarget};
use crate::domain::database::DatabaseConnection;
use crate::domain::environment::PRODUCTION_BRANCHES;
use secrecy::ExposeSecret;

/// Relationship carrying the primary database
pub const DATABASE_RELATIONSHIP: &str = "database";

/// Relationship carrying the cache service
pub const REDIS_RELATIONSHIP: &str = "redis";

/// Applies the Platform.sh overlay using the builder's reader
pub fn apply(mut builder: SettingsBuilder) -> SettingsBuilder {
    let Some(reader) = builder.take_platform_reader() else {
        tracing::debug!("No Platform.sh reader; skipping overlay");
        return builder;
    };

    let mut builder = apply_with(builder, reader.as_ref());
    builder.restore_platform_reader(reader);
    builder
}

fn apply_with(builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    let builder = apply_database(builder, reader);
    let builder = apply_logging(builder, reader);
    let builder = apply_redis(builder, reader);
    let mut builder = apply_runtime(builder, reader);

    builder
        .settings_mut()
        .set("trusted_host_patterns", vec![".*"]);

    import_variables(builder, reader)
}

fn apply_database(builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    if !reader.has_relationship(DATABASE_RELATIONSHIP) {
        tracing::debug!("No database relationship");
        return builder;
    }

    let credentials = match reader.credentials(DATABASE_RELATIONSHIP) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping database relationship");
            return builder;
        }
    };

    let connection = connection_from(credentials);
    if !connection.is_complete() {
        tracing::warn!(
            host = %connection.host,
            database = %connection.database,
            password_blank = connection.password.expose_secret().is_empty(),
            "Database relationship is incomplete (blank passwords count as missing); default connection left untouched"
        );
        return builder;
    }
    builder.with_database_connection(connection)
}

fn connection_from(credentials: Credentials) -> DatabaseConnection {
    let mut connection = DatabaseConnection::new(
        credentials.host,
        credentials.port,
        credentials.path.unwrap_or_default(),
        credentials.username.unwrap_or_default(),
        "",
    );
    if !credentials.scheme.is_empty() {
        connection = connection.with_driver(credentials.scheme);
    }
    if let Some(password) = credentials.password {
        connection.password = password;
    }
    connection
}

fn apply_logging(mut builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    let Some(branch) = reader.branch() else {
        return builder;
    };

    let level = if PRODUCTION_BRANCHES.contains(&branch) || reader.on_dedicated() {
        "hide"
    } else {
        "verbose"
    };
    builder
        .config_mut()
        .set_path(&["system.logging", "error_level"], level);
    builder
}

fn apply_redis(builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    if !reader.has_relationship(REDIS_RELATIONSHIP) {
        return builder;
    }
    let ambient = builder.ambient();
    if ambient.installing() || !ambient.extension_loaded("redis") {
        tracing::debug!(
            installing = ambient.installing(),
            "Redis relationship present but unusable; skipping"
        );
        return builder;
    }

    match reader.credentials(REDIS_RELATIONSHIP) {
        Ok(credentials) => {
            builder.with_redis(&credentials.host, credentials.port, credentials.password.as_ref())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Skipping redis relationship");
            builder
        }
    }
}

fn apply_runtime(builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    if !reader.in_runtime() {
        return builder;
    }

    let mut builder = match reader.app_dir() {
        Some(app_dir) => {
            let private_path = format!("{app_dir}/private");
            let mut builder = builder
                .with_private_file_path(private_path.clone())
                .with_temp_file_path(format!("{app_dir}/tmp"));
            let settings = builder.settings_mut();
            settings.set_path(&["php_storage", "default", "directory"], private_path.clone());
            settings.set_path(&["php_storage", "twig", "directory"], private_path);
            builder
        }
        None => builder,
    };

    let settings = builder.settings_mut();
    if let Some(tree_id) = reader.tree_id() {
        settings.set("deployment_identifier", tree_id);
    }
    if let Some(entropy) = reader.project_entropy() {
        settings.set("hash_salt", entropy);
    }
    builder
}

fn import_variables(mut builder: SettingsBuilder, reader: &dyn PlatformConfigReader) -> SettingsBuilder {
    for (name, value) in reader.variables() {
        match parse_variable_name(name) {
            Ok(Some(VariableTarget::Setting(key))) => {
                builder.settings_mut().set(key, value.clone());
            }
            Ok(Some(target @ VariableTarget::ConfigPath(..))) => {
                builder.config_mut().set_path(&target.path(), value.clone());
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(variable = %name, error = %e, "Skipping project variable");
            }
        }
    }
    builder
}
