//! Platform overlays
//!
//! One module per hosting platform. Each exposes `apply`, a
//! `fn(SettingsBuilder) -> SettingsBuilder` listed in the overlay table.
//! Overlays never fail: missing metadata is logged and skipped.

pub mod acquia;
pub mod lando;
pub mod pantheon;
pub mod platformsh;
