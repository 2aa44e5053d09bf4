//! Acquia Cloud overlay

use crate::core::builder::SettingsBuilder;
use std::path::PathBuf;

/// Directory holding the per-site include files
pub const SITE_PHP_ROOT: &str = "/var/www/site-php";

/// Include file provisioned for a site group
pub fn settings_include_path(root: &str, group: &str) -> PathBuf {
    PathBuf::from(root)
        .join(group)
        .join(format!("{group}-settings.toml"))
}

/// Points file paths at the shared mounts and includes the provisioned
/// settings file
pub fn apply(builder: SettingsBuilder) -> SettingsBuilder {
    let ambient = builder.ambient();
    let (Some(group), Some(env)) = (
        ambient.non_empty_var("AH_SITE_GROUP"),
        ambient.non_empty_var("AH_SITE_ENVIRONMENT"),
    ) else {
        tracing::warn!("AH_SITE_GROUP or AH_SITE_ENVIRONMENT missing; skipping Acquia overlay");
        return builder;
    };

    let private_path = format!("/mnt/files/{group}.{env}/files-private");
    let temp_path = format!("/mnt/gfs/{group}.{env}/tmp");
    let include = settings_include_path(SITE_PHP_ROOT, group);
    let config_sync = builder.app_path("config");

    builder
        .with_private_file_path(private_path)
        .with_temp_file_path(temp_path)
        .include_settings(include)
        .with_config_sync(config_sync)
}
