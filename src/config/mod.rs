//! Configuration module for Notidle.
//!
//! This module wires together the data model and the persisting manager used
//! throughout the crate. Import from here for a convenient, stable API.
//!
//! Example:
//! use notidle::config::ConfigManager;
//!
//! let mut manager = ConfigManager::new();
//! let cfg = manager.load()?;

pub mod manager;
pub mod models;

// Re-export core data model
pub use models::{Config, ConfigError, ConfigPatch};

// Re-export the manager
pub use manager::ConfigManager;

use schemars::{Schema, schema_for};

/// Generate the JSON Schema for the Config model (for external validation or tooling).
pub fn generate_schema() -> Schema {
    schema_for!(Config)
}
