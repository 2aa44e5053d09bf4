//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod build;
pub mod check_include;
pub mod detect;
