//! Utilities for Notidle.
//!
//! This module aggregates utility helpers used across the crate.
//!
//! Submodules:
//! - `paths`: Tilde expansion and default file locations.

pub mod paths;
