//! Runtime environment detection

use crate::config::ambient::{AmbientContext, ENV_SITE_ENVIRONMENT};
use crate::domain::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Branches treated as production on branch-based platforms
pub const PRODUCTION_BRANCHES: [&str; 2] = ["master", "main"];

/// Runtime environment of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Developer workstation
    Local,
    /// Shared development environment
    Dev,
    /// Pre-production
    Staging,
    /// Production
    #[default]
    Prod,
}

impl Environment {
    /// All environments
    pub const ALL: [Environment; 4] = [
        Environment::Local,
        Environment::Dev,
        Environment::Staging,
        Environment::Prod,
    ];

    /// Detects the environment
    ///
    /// `SITE_ENVIRONMENT` wins when it names a known environment. Otherwise
    /// each platform's own environment marker is mapped; an unknown
    /// platform is treated as production.
    pub fn detect(ambient: &AmbientContext, platform: Platform) -> Self {
        if let Some(explicit) = ambient.non_empty_var(ENV_SITE_ENVIRONMENT) {
            match explicit.parse() {
                Ok(environment) => return environment,
                Err(e) => tracing::warn!(error = %e, "Ignoring environment override"),
            }
        }

        match platform {
            Platform::Lando => Environment::Local,
            Platform::Acquia => ambient
                .var("AH_SITE_ENVIRONMENT")
                .map(from_acquia)
                .unwrap_or(Environment::Dev),
            Platform::PlatformSh => from_platformsh(ambient),
            Platform::Pantheon => match ambient.var("PANTHEON_ENVIRONMENT") {
                Some("live") => Environment::Prod,
                Some("test") => Environment::Staging,
                Some("lando") => Environment::Local,
                _ => Environment::Dev,
            },
            Platform::Generic => Environment::Prod,
        }
    }

    /// Returns the environment name
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

// Acquia names: dev, test, prod, plus numbered (01live) and on-demand (ode12)
fn from_acquia(name: &str) -> Environment {
    let name = name.to_lowercase();
    if name.contains("prod") || name.contains("live") {
        Environment::Prod
    } else if name.contains("test") || name.contains("stg") || name.contains("stage") {
        Environment::Staging
    } else {
        Environment::Dev
    }
}

fn from_platformsh(ambient: &AmbientContext) -> Environment {
    match ambient.var("PLATFORM_ENVIRONMENT_TYPE") {
        Some("production") => return Environment::Prod,
        Some("staging") => return Environment::Staging,
        Some("development") => return Environment::Dev,
        _ => {}
    }

    match ambient.var("PLATFORM_BRANCH") {
        Some(branch) if PRODUCTION_BRANCHES.contains(&branch) => Environment::Prod,
        _ => Environment::Dev,
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" | "development" => Ok(Environment::Dev),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "prod" | "production" | "live" => Ok(Environment::Prod),
            other => Err(format!(
                "Invalid environment '{other}'. Must be one of: local, dev, staging, prod"
            )),
        }
    }
}
