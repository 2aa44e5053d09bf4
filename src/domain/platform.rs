//! Hosting platform detection

use crate::config::ambient::{AmbientContext, ENV_SITE_PLATFORM};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hosting platform the site is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// No recognized provider
    #[default]
    Generic,
    /// Acquia Cloud
    Acquia,
    /// Platform.sh
    #[serde(rename = "platformsh")]
    PlatformSh,
    /// Pantheon
    Pantheon,
    /// Lando local development
    Lando,
}

impl Platform {
    /// All platforms, in detection order after an explicit override
    pub const ALL: [Platform; 5] = [
        Platform::Lando,
        Platform::Acquia,
        Platform::PlatformSh,
        Platform::Pantheon,
        Platform::Generic,
    ];

    /// Detects the platform from marker variables
    ///
    /// `SITE_PLATFORM` wins when it names a known platform. Lando is checked
    /// before Pantheon since Lando's Pantheon recipe also sets
    /// `PANTHEON_ENVIRONMENT`.
    pub fn detect(ambient: &AmbientContext) -> Self {
        if let Some(explicit) = ambient.non_empty_var(ENV_SITE_PLATFORM) {
            match explicit.parse() {
                Ok(platform) => return platform,
                Err(e) => tracing::warn!(error = %e, "Ignoring platform override"),
            }
        }

        let lando = ambient.var("LANDO_INFO").is_some()
            || ambient
                .var("LANDO")
                .is_some_and(|value| value.eq_ignore_ascii_case("on"));

        if lando {
            Platform::Lando
        } else if ambient.var("AH_SITE_ENVIRONMENT").is_some() {
            Platform::Acquia
        } else if ambient.var("PLATFORM_APPLICATION_NAME").is_some() {
            Platform::PlatformSh
        } else if ambient.var("PANTHEON_ENVIRONMENT").is_some() {
            Platform::Pantheon
        } else {
            Platform::Generic
        }
    }

    /// Returns the platform name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Generic => "generic",
            Platform::Acquia => "acquia",
            Platform::PlatformSh => "platformsh",
            Platform::Pantheon => "pantheon",
            Platform::Lando => "lando",
        }
    }

    /// Pantheon hands its variables over through the server context, so
    /// it does not need a populated environment.
    pub fn requires_env(&self) -> bool {
        !matches!(self, Platform::Pantheon)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "none" => Ok(Platform::Generic),
            "acquia" => Ok(Platform::Acquia),
            "platformsh" | "platform.sh" => Ok(Platform::PlatformSh),
            "pantheon" => Ok(Platform::Pantheon),
            "lando" => Ok(Platform::Lando),
            other => Err(format!(
                "Invalid platform '{other}'. Must be one of: generic, acquia, platformsh, pantheon, lando"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("LANDO_INFO", "{}", Platform::Lando ; "lando info")]
    #[test_case("LANDO", "ON", Platform::Lando ; "lando flag")]
    #[test_case("AH_SITE_ENVIRONMENT", "dev", Platform::Acquia ; "acquia")]
    #[test_case("PLATFORM_APPLICATION_NAME", "app", Platform::PlatformSh ; "platformsh")]
    #[test_case("PANTHEON_ENVIRONMENT", "live", Platform::Pantheon ; "pantheon")]
    #[test_case("UNRELATED", "1", Platform::Generic ; "generic")]
    fn test_detect(name: &str, value: &str, expected: Platform) {
        let ctx = AmbientContext::new().with_env(name, value);
        assert_eq!(Platform::detect(&ctx), expected);
    }

    #[test]
    fn test_lando_wins_over_pantheon() {
        let ctx = AmbientContext::new()
            .with_env("PANTHEON_ENVIRONMENT", "lando")
            .with_env("LANDO_INFO", "{}");
        assert_eq!(Platform::detect(&ctx), Platform::Lando);
    }

    #[test]
    fn test_pantheon_detected_from_server_context() {
        let ctx = AmbientContext::new()
            .with_variables_order("GPCS")
            .with_server("PANTHEON_ENVIRONMENT", "live");
        assert_eq!(Platform::detect(&ctx), Platform::Pantheon);
    }

    #[test]
    fn test_explicit_override() {
        let ctx = AmbientContext::new()
            .with_env("AH_SITE_ENVIRONMENT", "dev")
            .with_env(ENV_SITE_PLATFORM, "generic");
        assert_eq!(Platform::detect(&ctx), Platform::Generic);
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let ctx = AmbientContext::new()
            .with_env("AH_SITE_ENVIRONMENT", "dev")
            .with_env(ENV_SITE_PLATFORM, "heroku");
        assert_eq!(Platform::detect(&ctx), Platform::Acquia);
    }

    #[test]
    fn test_only_pantheon_is_exempt() {
        for platform in Platform::ALL {
            assert_eq!(platform.requires_env(), platform != Platform::Pantheon);
        }
    }

    #[test]
    fn test_display_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }
}
