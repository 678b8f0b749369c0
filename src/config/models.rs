use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed range for the fixed interval and both ends of the random range, in seconds.
pub const INTERVAL_MIN_SECONDS: u32 = 10;
pub const INTERVAL_MAX_SECONDS: u32 = 3600;

/// Allowed range for the mouse displacement, in pixels.
pub const MOVEMENT_MIN_PIXELS: u32 = 1;
pub const MOVEMENT_MAX_PIXELS: u32 = 100;

/// Tunable parameters for the anti-idle loop.
///
/// This structure is persisted as a flat JSON object with two-space
/// indentation. Missing fields deserialize to their defaults, so a config
/// written by an older build stays loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Fixed wait between activity cycles, in seconds (10–3600).
    pub interval_seconds: u32,

    /// How far the cursor is displaced before returning, in pixels (1–100).
    pub movement_pixels: u32,

    /// When true, skip the neutral key press and only move the mouse.
    pub silent_mode: bool,

    /// Where the activity log is appended. Supports `~` expansion.
    pub log_file_path: String,

    /// When true, each cycle draws its wait from the configured range
    /// instead of using `interval_seconds`.
    pub random_interval: bool,

    /// Lower bound of the random wait range, in seconds (10–3600).
    pub interval_range_min: u32,

    /// Upper bound of the random wait range, in seconds (10–3600, must be
    /// greater than `interval_range_min`).
    pub interval_range_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            movement_pixels: 2,
            silent_mode: false,
            log_file_path: "~/.notidle.log".to_string(),
            random_interval: false,
            interval_range_min: 10,
            interval_range_max: 60,
        }
    }
}

impl Config {
    /// Check every constraint and collect all violations, not just the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !(INTERVAL_MIN_SECONDS..=INTERVAL_MAX_SECONDS).contains(&self.interval_seconds) {
            errors.push(format!(
                "interval_seconds must be between {INTERVAL_MIN_SECONDS} and {INTERVAL_MAX_SECONDS}, got {}",
                self.interval_seconds
            ));
        }

        if !(MOVEMENT_MIN_PIXELS..=MOVEMENT_MAX_PIXELS).contains(&self.movement_pixels) {
            errors.push(format!(
                "movement_pixels must be between {MOVEMENT_MIN_PIXELS} and {MOVEMENT_MAX_PIXELS}, got {}",
                self.movement_pixels
            ));
        }

        if self.log_file_path.is_empty() {
            errors.push("log_file_path must be a non-empty string".to_string());
        }

        if !(INTERVAL_MIN_SECONDS..=INTERVAL_MAX_SECONDS).contains(&self.interval_range_min) {
            errors.push(format!(
                "interval_range_min must be between {INTERVAL_MIN_SECONDS} and {INTERVAL_MAX_SECONDS}, got {}",
                self.interval_range_min
            ));
        }

        if !(INTERVAL_MIN_SECONDS..=INTERVAL_MAX_SECONDS).contains(&self.interval_range_max) {
            errors.push(format!(
                "interval_range_max must be between {INTERVAL_MIN_SECONDS} and {INTERVAL_MAX_SECONDS}, got {}",
                self.interval_range_max
            ));
        }

        if self.interval_range_min >= self.interval_range_max {
            errors.push(format!(
                "interval_range_min ({}) must be less than interval_range_max ({})",
                self.interval_range_min, self.interval_range_max
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Return a copy of this record with the patch's set fields applied.
    /// The receiver is left untouched; validation is the caller's concern.
    #[must_use]
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.interval_seconds {
            next.interval_seconds = v;
        }
        if let Some(v) = patch.movement_pixels {
            next.movement_pixels = v;
        }
        if let Some(v) = patch.silent_mode {
            next.silent_mode = v;
        }
        if let Some(v) = &patch.log_file_path {
            next.log_file_path = v.clone();
        }
        if let Some(v) = patch.random_interval {
            next.random_interval = v;
        }
        if let Some(v) = patch.interval_range_min {
            next.interval_range_min = v;
        }
        if let Some(v) = patch.interval_range_max {
            next.interval_range_max = v;
        }
        next
    }
}

/// A partial configuration edit: every field optional, applied onto the
/// last-loaded record by [`Config::merged`].
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub interval_seconds: Option<u32>,
    pub movement_pixels: Option<u32>,
    pub silent_mode: Option<bool>,
    pub log_file_path: Option<String>,
    pub random_interval: Option<bool>,
    pub interval_range_min: Option<u32>,
    pub interval_range_max: Option<u32>,
}

impl ConfigPatch {
    /// Patch that only sets `interval_range_min`/`interval_range_max`.
    #[must_use]
    pub fn range(min: u32, max: u32) -> Self {
        Self {
            interval_range_min: Some(min),
            interval_range_max: Some(max),
            ..Self::default()
        }
    }
}

/// Errors raised by configuration validation and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One message per violated constraint, each naming the offending field.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    /// The individual violation messages (empty slice for non-validation errors).
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Invalid(errors) => errors,
        }
    }
}
