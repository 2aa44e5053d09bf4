//! Overlay building for site-settings.
//!
//! # Modules
//!
//! - [`builder`] - [`SettingsBuilder`], which owns the output maps
//! - [`overlays`] - the environment and platform overlay table
//! - [`platforms`] - one overlay per hosting platform
//! - [`variables`] - operator variable name parsing
//!
//! # Build order
//!
//! 1. **Detect**: platform, then environment, from the ambient context
//! 2. **Baseline**: flags, service files, file paths, fast 404
//! 3. **Environment overlays**: Dev (and local overrides for Local)
//! 4. **Platform overlay**: at most one
//! 5. **Finalize**: hand the maps to the caller
//!
//! # Example
//!
//! ```rust,no_run
//! use site_settings::config::AmbientContext;
//! use site_settings::core::SettingsBuilder;
//!
//! # fn example() -> site_settings::domain::Result<()> {
//! let builder = SettingsBuilder::create("/app/web", "sites/default", AmbientContext::from_process())?
//!     .with_defaults()
//!     .with_redis("127.0.0.1", 6379, None);
//!
//! let exports = builder.env_exports().clone();
//! let (settings, databases, config) = builder.finalize();
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod overlays;
pub mod platforms;
pub mod variables;

pub use builder::SettingsBuilder;
pub use overlays::{overlays_for, Overlay};
pub use variables::{parse_variable_name, VariableTarget};
