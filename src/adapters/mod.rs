//! Platform metadata adapters
//!
//! Hosting platforms describe the running site in their own formats. The
//! adapters here turn those descriptions into typed values for the overlay
//! builder:
//!
//! - [`platformsh`] - `PLATFORM_*` variables behind the
//!   [`PlatformConfigReader`] trait
//! - [`lando`] - the `LANDO_INFO` service payload

pub mod lando;
pub mod platformsh;

pub use lando::{LandoInfo, SearchIndex};
pub use platformsh::{Credentials, PlatformConfigReader, PlatformShConfig};
