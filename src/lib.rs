#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Notidle — an anti-idle helper that keeps a session awake with tiny Enigo nudges.
//!
//! On a timer, Notidle moves the mouse a few pixels and back (net zero
//! displacement) and optionally taps Shift, so the OS or a remote-desktop
//! session never considers the machine idle. Most implementation details live
//! under the internal modules:
//! - `config`: Configuration record, validation, and the persisting manager.
//! - `logger`: The append-only activity log handle.
//! - `simulator`: Input driver seam and the activity loop.
//! - `shell`: The interactive numbered menu.
//! - `utils`: Path helpers (tilde expansion, default locations).
//!
//! Use `notidle::prelude::*` to bring commonly used items into scope quickly.

/// Public module: configuration (record, validation, manager).
pub mod config;
/// Public module: append-only activity log.
pub mod logger;
/// Public module: interactive menu.
pub mod shell;
/// Public module: input driver seam and activity loop.
pub mod simulator;
/// Public module: utilities (path expansion helpers).
pub mod utils;

/// Crate-level constants for consumers that want to inspect package metadata at runtime.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version (e.g., "0.1.0").
#[inline]
pub const fn version() -> &'static str {
    PKG_VERSION
}

/// Initialize tracing (logging) with a reasonable default.
/// - Honors the `RUST_LOG` environment variable if set.
/// - Falls back to `info` level.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_tracing() {
    use tracing::Level;
    use tracing_subscriber::fmt;

    // Parse RUST_LOG as a simple level (trace|debug|info|warn|error)
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| match s.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        })
        .unwrap_or(Level::INFO);

    // Ignore the error if the global subscriber was already set.
    let _ = fmt().with_max_level(level).try_init();
}

/// A convenient set of exports for most consumers.
///
/// Bring this into scope with:
/// `use notidle::prelude::*;`
pub mod prelude {
    // Common result/error handling
    pub use anyhow::{Context, Error, Result, anyhow, bail, ensure};

    // Serialization
    pub use serde::{Deserialize, Serialize};

    // Tracing macros
    pub use tracing::{debug, error, info, instrument, trace, warn};

    // Timing helpers
    pub use std::time::Duration;
    pub use tokio::time::sleep;

    // External crates (namespaced) if callers want direct access
    pub use crate as notidle;
    pub use enigo;
    pub use rand;

    // Frequently used internal modules
    pub use crate::{config, logger, shell, simulator, utils};
}
