//! Overlay selection
//!
//! [`SettingsBuilder::with_defaults`] applies the environment overlays for
//! the detected environment, then the platform overlays for the detected
//! platform, in the order listed here. The table is data: Local reuses the
//! Dev overlay by listing it, not by falling through.

use crate::core::builder::SettingsBuilder;
use crate::core::platforms;
use crate::domain::environment::Environment;
use crate::domain::platform::Platform;

/// A named transformation of the builder
#[derive(Debug, Clone, Copy)]
pub struct Overlay {
    pub name: &'static str,
    pub apply: fn(SettingsBuilder) -> SettingsBuilder,
}

const DEV: Overlay = Overlay {
    name: "dev",
    apply: dev,
};

const LOCAL_SETTINGS: Overlay = Overlay {
    name: "local-settings",
    apply: local_settings,
};

const ACQUIA: Overlay = Overlay {
    name: "acquia",
    apply: platforms::acquia::apply,
};

const PLATFORM_SH: Overlay = Overlay {
    name: "platformsh",
    apply: platforms::platformsh::apply,
};

const PANTHEON: Overlay = Overlay {
    name: "pantheon",
    apply: platforms::pantheon::apply,
};

const LANDO: Overlay = Overlay {
    name: "lando",
    apply: platforms::lando::apply,
};

static LOCAL_OVERLAYS: [Overlay; 2] = [DEV, LOCAL_SETTINGS];
static DEV_OVERLAYS: [Overlay; 1] = [DEV];
static ACQUIA_OVERLAYS: [Overlay; 1] = [ACQUIA];
static PLATFORM_SH_OVERLAYS: [Overlay; 1] = [PLATFORM_SH];
static PANTHEON_OVERLAYS: [Overlay; 1] = [PANTHEON];
static LANDO_OVERLAYS: [Overlay; 1] = [LANDO];

/// Overlays for an environment
pub fn environment_overlays(environment: Environment) -> &'static [Overlay] {
    match environment {
        Environment::Local => &LOCAL_OVERLAYS,
        Environment::Dev => &DEV_OVERLAYS,
        Environment::Staging | Environment::Prod => &[],
    }
}

/// Overlays for a platform
pub fn platform_overlays(platform: Platform) -> &'static [Overlay] {
    match platform {
        Platform::Acquia => &ACQUIA_OVERLAYS,
        Platform::PlatformSh => &PLATFORM_SH_OVERLAYS,
        Platform::Pantheon => &PANTHEON_OVERLAYS,
        Platform::Lando => &LANDO_OVERLAYS,
        Platform::Generic => &[],
    }
}

/// Environment overlays followed by platform overlays
pub fn overlays_for(environment: Environment, platform: Platform) -> Vec<&'static Overlay> {
    environment_overlays(environment)
        .iter()
        .chain(platform_overlays(platform))
        .collect()
}

/// Verbose errors, no aggregation, development services
fn dev(builder: SettingsBuilder) -> SettingsBuilder {
    let services = builder.app_path("sites/services.dev.yml");
    let mut builder = builder.add_container_yaml(services);

    let config = builder.config_mut();
    config.set_path(&["system.logging", "error_level"], "verbose");
    config.set_path(&["system.performance", "css", "preprocess"], false);
    config.set_path(&["system.performance", "js", "preprocess"], false);

    let settings = builder.settings_mut();
    settings.set("extension_discovery_scan_tests", true);
    settings.set("skip_permissions_hardening", true);
    builder
}

fn local_settings(builder: SettingsBuilder) -> SettingsBuilder {
    builder.with_local_settings(None)
}
