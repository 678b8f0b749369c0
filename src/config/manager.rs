use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::models::{Config, ConfigPatch};
use crate::utils::paths;

/// Owns the on-disk configuration document and the last-loaded record.
///
/// Every write path validates the full record first; a record failing
/// validation is never persisted. An absent or unparsable document is
/// transparently replaced with a persisted default record on load.
pub struct ConfigManager {
    path: PathBuf,
    current: Option<Config>,
}

impl ConfigManager {
    /// Manager over the default user-local config path (`~/.notidle_config.json`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(paths::default_config_path())
    }

    /// Manager over an explicit config path. `~` is expanded.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: paths::expand_tilde(path.as_ref()),
            current: None,
        }
    }

    /// The resolved path of the config document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last record loaded or saved through this manager, if any.
    pub fn current(&self) -> Option<&Config> {
        self.current.as_ref()
    }

    /// Load the configuration, creating and persisting a default record when
    /// the file is absent, unreadable, or not valid JSON.
    pub fn load(&mut self) -> Result<Config> {
        let config = if self.path.exists() {
            match fs::read_to_string(&self.path)
                .map_err(anyhow::Error::from)
                .and_then(|raw| serde_json::from_str::<Config>(&raw).map_err(anyhow::Error::from))
            {
                Ok(cfg) => {
                    debug!("Loaded config from {}", self.path.display());
                    cfg
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        path = %self.path.display(),
                        "Config file unreadable or malformed; replacing with defaults"
                    );
                    let cfg = Config::default();
                    self.save(&cfg)?;
                    cfg
                }
            }
        } else {
            debug!(
                "No config at {}; creating default record",
                self.path.display()
            );
            let cfg = Config::default();
            self.save(&cfg)?;
            cfg
        };
        self.current = Some(config.clone());
        Ok(config)
    }

    /// Validate and persist the full record, then update the cached copy.
    ///
    /// Validation failures list every violated constraint and nothing is
    /// written. The document is written whole, pretty-printed with two-space
    /// indentation.
    pub fn save(&mut self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }

        let json =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;

        self.current = Some(config.clone());
        Ok(())
    }

    /// Merge the patch onto the last-loaded record (loading first if needed),
    /// validate and persist the result, and return the new record. The
    /// previous in-memory record is never mutated in place.
    pub fn update(&mut self, patch: ConfigPatch) -> Result<Config> {
        let base = match &self.current {
            Some(cfg) => cfg.clone(),
            None => self.load()?,
        };
        let next = base.merged(&patch);
        self.save(&next)?;
        Ok(next)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(dir.path().join("config.json"))
    }

    #[test]
    fn test_load_creates_and_persists_defaults() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, Config::default());
        assert!(manager.path().exists());

        let on_disk: Config =
            serde_json::from_str(&fs::read_to_string(manager.path()).unwrap()).unwrap();
        assert_eq!(on_disk, Config::default());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);

        let config = Config {
            interval_seconds: 45,
            movement_pixels: 7,
            silent_mode: true,
            log_file_path: "/tmp/activity.log".to_string(),
            random_interval: true,
            interval_range_min: 20,
            interval_range_max: 90,
        };
        manager.save(&config).unwrap();

        let mut fresh = manager_in(&dir);
        assert_eq!(fresh.load().unwrap(), config);
    }

    #[test]
    fn test_malformed_file_replaced_with_defaults() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        fs::write(manager.path(), "{ this is not json").unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, Config::default());

        // The replacement was persisted as a valid document.
        let on_disk: Config =
            serde_json::from_str(&fs::read_to_string(manager.path()).unwrap()).unwrap();
        assert_eq!(on_disk, Config::default());
    }

    #[test]
    fn test_save_refuses_invalid_record() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);

        let bad = Config {
            interval_seconds: 1,
            ..Config::default()
        };
        let err = manager.save(&bad).unwrap_err();
        assert!(err.to_string().contains("interval_seconds"));
        assert!(!manager.path().exists());
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_update_merges_persists_and_keeps_old_record_intact() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        let before = manager.load().unwrap();

        let patch = ConfigPatch {
            interval_seconds: Some(120),
            silent_mode: Some(true),
            ..ConfigPatch::default()
        };
        let after = manager.update(patch).unwrap();

        assert_eq!(after.interval_seconds, 120);
        assert!(after.silent_mode);
        // The record handed out before the update is untouched.
        assert_eq!(before.interval_seconds, 300);
        assert!(!before.silent_mode);

        let mut fresh = manager_in(&dir);
        assert_eq!(fresh.load().unwrap(), after);
    }

    #[test]
    fn test_update_with_invalid_patch_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();

        let err = manager
            .update(ConfigPatch {
                interval_seconds: Some(5),
                ..ConfigPatch::default()
            })
            .unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(config_err.to_string().contains("interval_seconds"));

        assert_eq!(manager.current(), Some(&Config::default()));
        let on_disk: Config =
            serde_json::from_str(&fs::read_to_string(manager.path()).unwrap()).unwrap();
        assert_eq!(on_disk, Config::default());
    }

    #[test]
    fn test_range_patch_validated_as_a_pair() {
        let dir = TempDir::new().unwrap();
        let mut manager = manager_in(&dir);
        manager.load().unwrap();

        let err = manager.update(ConfigPatch::range(90, 30)).unwrap_err();
        assert!(err.to_string().contains("interval_range_min"));

        let updated = manager.update(ConfigPatch::range(30, 90)).unwrap();
        assert_eq!(updated.interval_range_min, 30);
        assert_eq!(updated.interval_range_max, 90);
    }
}
