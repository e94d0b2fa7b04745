//! Store configuration.
//!
//! Read from `settings.json` in the application directory:
//! ```json
//! { "storageKey": "users", "defaultPageSize": 10, "logLevel": "info", "seedSampleData": false }
//! ```
//! Every key is optional. `USERDIR_STORAGE_KEY` and `USERDIR_LOG_LEVEL`
//! override the file.

use crate::logging::{default_log_level, init_logging, normalize_level};
use crate::query::DEFAULT_PAGE_SIZE;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_STORAGE_KEY: &str = "users";
const STORAGE_KEY_ENV: &str = "USERDIR_STORAGE_KEY";
const LOG_LEVEL_ENV: &str = "USERDIR_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Key the serialized collection lives under.
    pub storage_key: String,
    /// Page size of `UserStore::default_page`; 0 is read as the default.
    pub default_page_size: usize,
    /// Level passed to the rolling file logger by `init_logging`.
    pub log_level: String,
    /// Install the sample users when the loaded collection is empty.
    pub seed_sample_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            log_level: default_log_level().to_string(),
            seed_sample_data: false,
        }
    }
}

impl StoreConfig {
    /// Loads `settings.json` from `dir`, then applies environment overrides.
    ///
    /// A missing or unparsable file falls back to defaults; a broken file is
    /// logged, not returned.
    pub fn load(dir: &Path) -> Self {
        let mut config = Self::read_file(&dir.join(SETTINGS_FILE_NAME));
        config.apply_overrides(
            std::env::var(STORAGE_KEY_ENV).ok(),
            std::env::var(LOG_LEVEL_ENV).ok(),
        );
        config.sanitize();
        config
    }

    /// Writes the current values to `dir/settings.json`.
    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(SETTINGS_FILE_NAME), content)
    }

    /// Starts the file logger at the configured level.
    ///
    /// Same contract as `logging::init_logging`: repeat calls with the same
    /// level and directory are no-ops, conflicting ones are rejected.
    pub fn init_logging(&self, log_dir: &str) -> Result<(), String> {
        init_logging(&self.log_level, log_dir)
    }

    fn read_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!(
                    "event=config_load module=config status=fallback reason=read_failed error={err}"
                );
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            warn!("event=config_load module=config status=fallback reason=parse_failed error={err}");
            Self::default()
        })
    }

    fn apply_overrides(&mut self, storage_key: Option<String>, log_level: Option<String>) {
        if let Some(key) = storage_key.filter(|key| !key.trim().is_empty()) {
            self.storage_key = key;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
    }

    fn sanitize(&mut self) {
        if self.storage_key.trim().is_empty() {
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        if self.default_page_size == 0 {
            self.default_page_size = DEFAULT_PAGE_SIZE;
        }
        match normalize_level(&self.log_level) {
            Ok(level) => self.log_level = level.to_string(),
            Err(err) => {
                warn!("event=config_load module=config status=fallback field=logLevel error={err}");
                self.log_level = default_log_level().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DEFAULT_STORAGE_KEY, SETTINGS_FILE_NAME};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::read_file(&dir.path().join(SETTINGS_FILE_NAME));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{ "storageKey": "staff", "seedSampleData": true }"#).unwrap();

        let config = StoreConfig::read_file(&path);
        assert_eq!(config.storage_key, "staff");
        assert!(config.seed_sample_data);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(StoreConfig::read_file(&path), StoreConfig::default());
    }

    #[test]
    fn overrides_and_sanitize_apply_in_order() {
        let mut config = StoreConfig {
            default_page_size: 0,
            ..StoreConfig::default()
        };
        config.apply_overrides(Some("people".to_string()), Some("WARNING".to_string()));
        config.sanitize();
        assert_eq!(config.storage_key, "people");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.default_page_size, 10);

        config.apply_overrides(Some("  ".to_string()), Some("loud".to_string()));
        config.sanitize();
        assert_eq!(config.storage_key, "people");
        assert_ne!(config.log_level, "loud");
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            storage_key: "team".to_string(),
            default_page_size: 25,
            log_level: "error".to_string(),
            seed_sample_data: true,
        };
        config.save(dir.path()).unwrap();
        assert_eq!(StoreConfig::read_file(&dir.path().join(SETTINGS_FILE_NAME)), config);
    }
}
