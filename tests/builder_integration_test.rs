//! Integration tests for the overlay builder across platforms

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use site_settings::config::AmbientContext;
use site_settings::core::SettingsBuilder;
use site_settings::domain::{Environment, Platform, SettingsError};
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

const LANDO_INFO: &str = r#"{
    "appserver": {"type": "php"},
    "database": {
        "internal_connection": {"host": "database", "port": "3306"},
        "creds": [{"database": "drupal9", "user": "drupal9", "password": "drupal9"}]
    },
    "index": {
        "internal_connection": {"host": "index", "port": 8983},
        "path": "/solr/drupal"
    }
}"#;

fn create(app_root: &str, ambient: AmbientContext) -> SettingsBuilder {
    SettingsBuilder::create(app_root, "sites/default", ambient).unwrap()
}

fn encode(value: Value) -> String {
    STANDARD.encode(value.to_string())
}

#[test]
fn test_lando_end_to_end() {
    let ambient = AmbientContext::new().with_env("LANDO_INFO", LANDO_INFO);
    let builder = create("/app/web", ambient);
    assert_eq!(builder.platform(), Platform::Lando);
    assert_eq!(builder.environment(), Environment::Local);

    let builder = builder.with_defaults();
    let exports = builder.env_exports().clone();
    let (settings, databases, config) = builder.finalize();

    let conn = databases.default_connection().unwrap();
    assert_eq!(conn.host, "database");
    assert_eq!(conn.port, 3306);
    assert_eq!(conn.database, "drupal9");
    assert_eq!(conn.username, "drupal9");
    assert_eq!(conn.password.expose_secret(), "drupal9");
    assert_eq!(conn.driver, "mysql");

    assert_eq!(exports.get("SOLR_HOST").map(String::as_str), Some("index"));
    assert_eq!(exports.get("SOLR_PORT").map(String::as_str), Some("8983"));
    assert_eq!(exports.get("SOLR_CORE").map(String::as_str), Some("drupal"));
    assert_eq!(exports.get("SOLR_PATH").map(String::as_str), Some("/solr/drupal"));

    assert_eq!(
        config.get_path(&["system.logging", "error_level"]),
        Some(&json!("verbose"))
    );
    assert_eq!(
        settings.get("container_yamls"),
        Some(&json!([
            "/app/web/sites/default/services.yml",
            "/app/web/sites/services.dev.yml"
        ]))
    );
}

#[test]
fn test_local_is_superset_of_dev() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_string_lossy().into_owned();

    let dev = create(&root, AmbientContext::new().with_env("SITE_ENVIRONMENT", "dev"))
        .with_defaults()
        .finalize();
    let local = create(&root, AmbientContext::new().with_env("SITE_ENVIRONMENT", "local"))
        .with_defaults()
        .finalize();

    for (key, value) in dev.0.as_map() {
        assert_eq!(local.0.get(key), Some(value), "settings key {key}");
    }
    for (key, value) in dev.2.as_map() {
        assert_eq!(local.2.get(key), Some(value), "config key {key}");
    }
}

#[test]
fn test_local_settings_override_dev() {
    let dir = TempDir::new().unwrap();
    let site = dir.path().join("sites/default");
    fs::create_dir_all(&site).unwrap();
    fs::write(
        site.join("settings.local.toml"),
        r#"
[settings]
skip_permissions_hardening = false

[config."system.logging"]
error_level = "all"
"#,
    )
    .unwrap();

    let root = dir.path().to_string_lossy().into_owned();
    let (settings, _, config) = create(&root, AmbientContext::new().with_env("SITE_ENVIRONMENT", "local"))
        .with_defaults()
        .finalize();

    assert_eq!(settings.get("skip_permissions_hardening"), Some(&json!(false)));
    assert_eq!(
        config.get_path(&["system.logging", "error_level"]),
        Some(&json!("all"))
    );
    assert_eq!(
        config.get_path(&["system.performance", "css", "preprocess"]),
        Some(&json!(false))
    );
}

#[test]
fn test_acquia_end_to_end() {
    let ambient = AmbientContext::new()
        .with_env("AH_SITE_GROUP", "acme")
        .with_env("AH_SITE_ENVIRONMENT", "01live");
    let builder = create("/var/www/html/acme.01live/docroot", ambient);
    assert_eq!(builder.platform(), Platform::Acquia);
    assert_eq!(builder.environment(), Environment::Prod);

    let (settings, _, config) = builder.with_defaults().finalize();
    assert_eq!(
        settings.get("file_private_path"),
        Some(&json!("/mnt/files/acme.01live/files-private"))
    );
    assert_eq!(settings.get("file_temp_path"), Some(&json!("/mnt/gfs/acme.01live/tmp")));
    assert!(!config.contains_path(&["system.logging", "error_level"]));
}

#[test]
fn test_platformsh_end_to_end() {
    let ambient = AmbientContext::new()
        .with_env("PLATFORM_APPLICATION_NAME", "drupal")
        .with_env("PLATFORM_BRANCH", "main")
        .with_env("PLATFORM_ENVIRONMENT", "main-bvxea6i")
        .with_env("PLATFORM_APP_DIR", "/app")
        .with_env("PLATFORM_TREE_ID", "2a9f1c")
        .with_env("PLATFORM_PROJECT_ENTROPY", "entropy-value")
        .with_env(
            "PLATFORM_RELATIONSHIPS",
            encode(json!({
                "database": [{
                    "scheme": "mysql", "host": "database.internal", "port": 3306,
                    "path": "main", "username": "user", "password": "secret"
                }],
                "redis": [{"scheme": "redis", "host": "redis.internal", "port": 6379}]
            })),
        )
        .with_env(
            "PLATFORM_VARIABLES",
            encode(json!({
                "d8config:system.site:name": "Example",
                "drupal:skip_permissions_hardening": true,
                "d8settings:bad:nested": "rejected"
            })),
        )
        .with_extension("redis");

    let builder = create("/app/web", ambient);
    assert_eq!(builder.platform(), Platform::PlatformSh);
    assert_eq!(builder.environment(), Environment::Prod);

    let (settings, databases, config) = builder.with_defaults().finalize();

    assert_eq!(databases.default_connection().unwrap().host, "database.internal");
    assert_eq!(
        config.get_path(&["system.logging", "error_level"]),
        Some(&json!("hide"))
    );
    assert_eq!(config.get_path(&["system.site", "name"]), Some(&json!("Example")));
    assert_eq!(settings.get("skip_permissions_hardening"), Some(&json!(true)));
    assert!(settings.get("bad").is_none());
    assert_eq!(settings.get("file_private_path"), Some(&json!("/app/private")));
    assert_eq!(settings.get("deployment_identifier"), Some(&json!("2a9f1c")));
    assert_eq!(settings.get("hash_salt"), Some(&json!("entropy-value")));
    assert_eq!(
        settings.get_path(&["redis.connection", "host"]),
        Some(&json!("redis.internal"))
    );
    assert_eq!(settings.get("trusted_host_patterns"), Some(&json!([".*"])));
}

#[test]
fn test_pantheon_end_to_end_without_env() {
    let pressflow = json!({
        "conf": {"pantheon_environment": "live"},
        "databases": {"default": {"default": {
            "host": "dbserver.live.example", "port": 10033, "database": "pantheon",
            "username": "pantheon", "password": "pw", "driver": "mysql"
        }}}
    });
    let ambient = AmbientContext::new()
        .with_variables_order("GPCS")
        .with_server("PANTHEON_ENVIRONMENT", "live")
        .with_server("PRESSFLOW_SETTINGS", pressflow.to_string());

    let builder = create("/code", ambient);
    assert_eq!(builder.platform(), Platform::Pantheon);
    assert_eq!(builder.environment(), Environment::Prod);

    let (settings, databases, config) = builder.with_defaults().finalize();
    assert_eq!(databases.default_connection().unwrap().port, 10033);
    assert_eq!(config.get("pantheon_environment"), Some(&json!("live")));
    assert_eq!(
        settings.get("file_private_path"),
        Some(&json!("sites/default/files/private"))
    );
    assert_eq!(settings.get("trusted_host_patterns"), Some(&json!([".*"])));
}

#[test]
fn test_precondition_fails_without_env() {
    let ambient = AmbientContext::new()
        .with_variables_order("gpcs")
        .with_env("AH_SITE_ENVIRONMENT", "prod");
    let result = SettingsBuilder::create("/app", "sites/default", ambient);
    assert!(matches!(result, Err(SettingsError::Precondition(_))));
}

#[test]
fn test_lowercase_variables_order_is_populated() {
    let ambient = AmbientContext::new().with_variables_order("egpcs");
    assert!(SettingsBuilder::create("/app", "sites/default", ambient).is_ok());
}

#[test]
fn test_with_database_overwrites_platform_connection() {
    let ambient = AmbientContext::new().with_env("LANDO_INFO", LANDO_INFO);
    let (_, databases, _) = create("/app/web", ambient)
        .with_defaults()
        .with_database("override", 3307, "other", "me", "pw")
        .finalize();

    let conn = databases.default_connection().unwrap();
    assert_eq!(conn.host, "override");
    assert_eq!(conn.port, 3307);
    assert_eq!(conn.database, "other");
}

#[test_case(Platform::Lando ; "lando")]
#[test_case(Platform::PlatformSh ; "platformsh")]
#[test_case(Platform::Pantheon ; "pantheon")]
#[test_case(Platform::Acquia ; "acquia")]
#[test_case(Platform::Generic ; "generic")]
fn test_incomplete_metadata_leaves_default_connection_absent(platform: Platform) {
    let ambient = AmbientContext::new()
        .with_env("SITE_PLATFORM", platform.as_str())
        .with_env("AH_SITE_GROUP", "acme")
        .with_env("AH_SITE_ENVIRONMENT", "dev")
        .with_env("PLATFORM_APPLICATION_NAME", "drupal")
        .with_env(
            "PLATFORM_RELATIONSHIPS",
            encode(json!({"database": [{"host": "database.internal", "port": 3306, "path": "main"}]})),
        )
        .with_env(
            "LANDO_INFO",
            r#"{"database": {"internal_connection": {"host": "database", "port": 3306},
                "creds": {"user": "drupal9", "password": "drupal9"}}}"#,
        )
        .with_server(
            "PRESSFLOW_SETTINGS",
            json!({"databases": {"default": {"default": {"host": "db"}}}}).to_string(),
        );

    let builder = create("/app/web", ambient);
    assert_eq!(builder.platform(), platform);

    let (_, databases, _) = builder.with_defaults().finalize();
    assert!(databases.default_connection().is_none());
}
