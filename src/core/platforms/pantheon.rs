//! Pantheon overlay
//!
//! Pantheon passes its variables through the server context, including
//! `PRESSFLOW_SETTINGS`, a JSON document with `conf` and `databases`.

use crate::core::builder::SettingsBuilder;
use serde_json::Value;

/// Private files directory relative to the web root
pub const PRIVATE_PATH: &str = "sites/default/files/private";

/// Temporary directory
pub const TEMP_PATH: &str = "/tmp";

/// Config sync directory relative to the web root
pub const CONFIG_SYNC_PATH: &str = "sites/default/files/config";

/// Container service provider registered on every Pantheon site
pub const SERVICE_PROVIDER_CLASS: &str = r"\Pantheon\Internal\PantheonServiceProvider";

/// Applies the Pantheon overlay
pub fn apply(builder: SettingsBuilder) -> SettingsBuilder {
    let builder = builder
        .with_private_file_path(PRIVATE_PATH)
        .with_temp_file_path(TEMP_PATH)
        .with_config_sync(CONFIG_SYNC_PATH);

    let builder = apply_pressflow_settings(builder);
    let mut builder = apply_rolling_tmp(builder);

    let settings = builder.settings_mut();
    settings.set_path(
        &["container_service_providers", "PantheonServiceProvider"],
        SERVICE_PROVIDER_CLASS,
    );
    settings.push("trusted_host_patterns", ".*");

    builder.with_pantheon_secrets(None)
}

fn apply_pressflow_settings(mut builder: SettingsBuilder) -> SettingsBuilder {
    let Some(raw) = builder.ambient().server("PRESSFLOW_SETTINGS") else {
        tracing::debug!("No PRESSFLOW_SETTINGS");
        return builder;
    };

    let payload = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(payload)) => payload,
        Ok(_) => {
            tracing::warn!("PRESSFLOW_SETTINGS is not an object; skipping");
            return builder;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed PRESSFLOW_SETTINGS");
            return builder;
        }
    };

    for (key, value) in payload {
        match key.as_str() {
            "conf" => match value {
                Value::Object(conf) => {
                    let config = builder.config_mut();
                    for (name, entry) in conf {
                        config.set(name, entry);
                    }
                }
                _ => tracing::warn!("PRESSFLOW_SETTINGS conf is not an object; skipping"),
            },
            "databases" => merge_databases(&mut builder, value),
            other => tracing::debug!(key = other, "Ignoring PRESSFLOW_SETTINGS entry"),
        }
    }
    builder
}

fn merge_databases(builder: &mut SettingsBuilder, payload: Value) {
    let databases = builder.databases_mut();
    let previous = databases.clone();
    if let Err(e) = databases.merge_json(payload) {
        tracing::warn!(error = %e, "Skipping PRESSFLOW_SETTINGS databases");
        return;
    }

    // The default connection is complete or left as it was.
    if databases
        .default_connection()
        .is_some_and(|conn| !conn.is_complete())
    {
        tracing::warn!("PRESSFLOW_SETTINGS default connection is incomplete; databases left untouched");
        *databases = previous;
    }
}

fn apply_rolling_tmp(mut builder: SettingsBuilder) -> SettingsBuilder {
    let ambient = builder.ambient();
    let (Some(rolling_tmp), Some(deployment_id)) = (
        ambient.non_empty_var("PANTHEON_ROLLING_TMP"),
        ambient.non_empty_var("PANTHEON_DEPLOYMENT_IDENTIFIER"),
    ) else {
        return builder;
    };

    let hash_salt = ambient.var("DRUPAL_HASH_SALT").unwrap_or_default();
    let secret = format!("{hash_salt}{deployment_id}");
    let rolling_tmp = rolling_tmp.to_string();
    let deployment_id = deployment_id.to_string();

    let settings = builder.settings_mut();
    settings.set_path(&["php_storage", "twig", "directory"], rolling_tmp);
    settings.set_path(&["php_storage", "twig", "secret"], secret);
    settings.set("deployment_identifier", deployment_id);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmbientContext;
    use serde_json::json;

    fn builder(ambient: AmbientContext) -> SettingsBuilder {
        SettingsBuilder::create("/code", "sites/default", ambient).unwrap()
    }

    #[test]
    fn test_base_paths_and_service_provider() {
        let builder = apply(builder(AmbientContext::new()));
        let settings = builder.settings();

        assert_eq!(settings.get("file_private_path"), Some(&json!(PRIVATE_PATH)));
        assert_eq!(settings.get("file_temp_path"), Some(&json!("/tmp")));
        assert_eq!(settings.get("config_sync_directory"), Some(&json!(CONFIG_SYNC_PATH)));
        assert_eq!(
            settings.get_path(&["container_service_providers", "PantheonServiceProvider"]),
            Some(&json!(r"\Pantheon\Internal\PantheonServiceProvider"))
        );
        assert_eq!(settings.get("trusted_host_patterns"), Some(&json!([".*"])));
    }

    #[test]
    fn test_pressflow_settings() {
        let pressflow = json!({
            "conf": {"pressflow_smart_start": true, "pantheon_binding": "abc"},
            "databases": {"default": {"default": {
                "host": "dbserver", "port": "10234", "database": "pantheon",
                "username": "pantheon", "password": "pw", "driver": "mysql"
            }}},
            "drupal_hash_salt": "ignored"
        });
        let ambient = AmbientContext::new().with_server("PRESSFLOW_SETTINGS", pressflow.to_string());
        let builder = builder(ambient).with_database("local", 3306, "site", "u", "p");

        let builder = apply(builder);

        assert_eq!(builder.config().get("pressflow_smart_start"), Some(&json!(true)));
        assert_eq!(builder.config().get("pantheon_binding"), Some(&json!("abc")));
        let conn = builder.databases().default_connection().unwrap();
        assert_eq!(conn.host, "dbserver");
        assert_eq!(conn.port, 10234);
    }

    #[test]
    fn test_pressflow_databases_additive() {
        let pressflow = json!({"databases": {"migrate": {"default": {
            "host": "old", "port": 3306, "database": "d7", "username": "u", "password": "p"
        }}}});
        let ambient = AmbientContext::new().with_server("PRESSFLOW_SETTINGS", pressflow.to_string());
        let builder = builder(ambient).with_database("db", 3306, "site", "user", "pass");

        let builder = apply(builder);

        assert_eq!(builder.databases().default_connection().unwrap().host, "db");
        assert_eq!(builder.databases().get("migrate", "default").unwrap().host, "old");
    }

    #[test]
    fn test_pressflow_blank_password_leaves_databases_untouched() {
        let pressflow = json!({"databases": {
            "default": {"default": {
                "host": "dbserver", "port": 10234, "database": "pantheon",
                "username": "pantheon", "password": ""
            }},
            "migrate": {"default": {
                "host": "old", "port": 3306, "database": "d7", "username": "u", "password": "p"
            }}
        }});
        let ambient = AmbientContext::new().with_server("PRESSFLOW_SETTINGS", pressflow.to_string());
        let builder = apply(builder(ambient));

        assert!(builder.databases().is_empty());
    }

    #[test]
    fn test_pressflow_blank_password_keeps_existing_default() {
        let pressflow = json!({"databases": {"default": {"default": {"password": ""}}}});
        let ambient = AmbientContext::new().with_server("PRESSFLOW_SETTINGS", pressflow.to_string());
        let builder = builder(ambient).with_database("db", 3306, "site", "user", "pass");

        let builder = apply(builder);

        let conn = builder.databases().default_connection().unwrap();
        assert!(conn.is_complete());
        assert_eq!(conn.host, "db");
    }

    #[test]
    fn test_malformed_pressflow_settings() {
        let ambient = AmbientContext::new().with_server("PRESSFLOW_SETTINGS", "{not json");
        let builder = apply(builder(ambient));
        assert!(builder.config().is_empty());
        assert!(builder.databases().is_empty());
    }

    #[test]
    fn test_rolling_tmp() {
        let ambient = AmbientContext::new()
            .with_server("PANTHEON_ROLLING_TMP", "/srv/bindings/abc/tmp")
            .with_server("PANTHEON_DEPLOYMENT_IDENTIFIER", "deploy-1")
            .with_server("DRUPAL_HASH_SALT", "salt-");
        let builder = apply(builder(ambient));
        let settings = builder.settings();

        assert_eq!(
            settings.get_path(&["php_storage", "twig", "directory"]),
            Some(&json!("/srv/bindings/abc/tmp"))
        );
        assert_eq!(
            settings.get_path(&["php_storage", "twig", "secret"]),
            Some(&json!("salt-deploy-1"))
        );
        assert_eq!(settings.get("deployment_identifier"), Some(&json!("deploy-1")));
    }

    #[test]
    fn test_rolling_tmp_requires_both() {
        let ambient = AmbientContext::new().with_server("PANTHEON_ROLLING_TMP", "/tmp/rolling");
        let builder = apply(builder(ambient));
        assert!(builder.settings().get("php_storage").is_none());
        assert!(builder.settings().get("deployment_identifier").is_none());
    }
}
