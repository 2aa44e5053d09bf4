//! Integration tests for settings include files and Pantheon secrets

use secrecy::ExposeSecret;
use serde_json::json;
use site_settings::config::{load_include, AmbientContext};
use site_settings::core::SettingsBuilder;
use site_settings::domain::SettingsError;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

fn builder(root: &std::path::Path, ambient: AmbientContext) -> SettingsBuilder {
    SettingsBuilder::create(root, "sites/default", ambient).unwrap()
}

#[test]
fn test_include_resolves_placeholders() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.toml");
    fs::write(
        &path,
        r#"
[settings]
file_private_path = "${APP_ROOT}/../private"
hash_salt = "${HASH_SALT}"

[databases.default.default]
host = "127.0.0.1"
port = "3306"
database = "site"
username = "site"
password = "${DB_PASSWORD}"
"#,
    )
    .unwrap();

    let ambient = AmbientContext::new()
        .with_env("HASH_SALT", "salty")
        .with_env("DB_PASSWORD", "hunter2");
    let builder = builder(dir.path(), ambient).include_settings(&path);

    let expected_private = format!("{}/../private", dir.path().display());
    assert_eq!(
        builder.settings().get("file_private_path"),
        Some(&json!(expected_private))
    );
    assert_eq!(builder.settings().get("hash_salt"), Some(&json!("salty")));

    let conn = builder.databases().default_connection().unwrap();
    assert_eq!(conn.port, 3306);
    assert_eq!(conn.password.expose_secret(), "hunter2");
}

#[test]
fn test_include_with_missing_variable_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.toml");
    fs::write(&path, "[settings]\nhash_salt = \"${NOT_SET}\"\n").unwrap();

    let err = load_include(&path, &AmbientContext::new(), &[]).unwrap_err();
    assert!(matches!(err, SettingsError::Include { .. }));
    assert!(err.to_string().contains("NOT_SET"));

    let builder = builder(dir.path(), AmbientContext::new()).include_settings(&path);
    assert!(builder.settings().get("hash_salt").is_none());
}

#[test]
fn test_json_include() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"config": {{"system.site": {{"name": "From JSON"}}}}}}"#
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let builder = builder(dir.path(), AmbientContext::new()).include_settings(file.path());
    assert_eq!(
        builder.config().get_path(&["system.site", "name"]),
        Some(&json!("From JSON"))
    );
}

#[test]
fn test_include_deep_merges_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.toml");
    fs::write(
        &path,
        "[config.\"system.performance\".fast_404]\nhtml = \"gone\"\n",
    )
    .unwrap();

    let builder = builder(dir.path(), AmbientContext::new())
        .with_fast_404()
        .include_settings(&path);

    let config = builder.config();
    assert_eq!(
        config.get_path(&["system.performance", "fast_404", "html"]),
        Some(&json!("gone"))
    );
    assert!(config.contains_path(&["system.performance", "fast_404", "paths"]));
}

#[test]
fn test_unknown_table_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("overrides.toml");
    fs::write(&path, "[setings]\nhash_salt = \"typo\"\n").unwrap();

    assert!(load_include(&path, &AmbientContext::new(), &[]).is_err());
}

#[test]
fn test_pantheon_secrets_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secrets.json");
    fs::write(&path, r#"{"STRIPE_KEY": "sk_test", "FEATURE_ON": true}"#).unwrap();

    let builder = builder(dir.path(), AmbientContext::new()).with_pantheon_secrets(Some(path));

    assert_eq!(builder.ambient().env("STRIPE_KEY"), Some("sk_test"));
    assert_eq!(builder.ambient().env("FEATURE_ON"), Some("true"));
    assert_eq!(builder.env_exports().len(), 2);
}

#[test]
fn test_pantheon_secrets_missing_file() {
    let dir = TempDir::new().unwrap();
    let builder = builder(dir.path(), AmbientContext::new())
        .with_pantheon_secrets(Some(dir.path().join("absent.json")));
    assert!(builder.env_exports().is_empty());
}
