//! Lando overlay

use crate::core::builder::SettingsBuilder;

/// Writes the database from `LANDO_INFO`, exports the search service
/// location and includes the local override file
pub fn apply(builder: SettingsBuilder) -> SettingsBuilder {
    let (connection, index) = match builder.lando_info() {
        Some(info) => (Some(info.database_connection()), info.search_index()),
        None => {
            tracing::debug!("No Lando metadata");
            (None, None)
        }
    };

    let mut builder = match connection {
        Some(Ok(connection)) if connection.is_complete() => {
            builder.with_database_connection(connection)
        }
        Some(Ok(_)) => {
            tracing::warn!("Lando database credentials are incomplete; skipping");
            builder
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Skipping Lando database");
            builder
        }
        None => builder,
    };

    if let Some(index) = index {
        let ambient = builder.ambient_mut();
        ambient.set_env("SOLR_HOST", index.host);
        ambient.set_env("SOLR_PORT", index.port.to_string());
        ambient.set_env("SOLR_CORE", index.core);
        ambient.set_env("SOLR_PATH", index.path);
    }

    builder.with_local_settings(None)
}
