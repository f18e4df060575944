//! Desk configuration and its JSON persistence.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::EditorSettings;

const APP_DIR: &str = "clinicdesk";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("No data directory available on this platform")]
    NoDataDir,
}

/// User-adjustable settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClinicConfig {
    /// Where the database lives; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    /// Where snapshots go; the OS temp dir when unset
    pub backup_dir: Option<PathBuf>,
    pub redirect_delay_ms: u64,
    /// Offer the follow-up date on the new-visit form
    pub supports_follow_up: bool,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "clinicdesk.db".into(),
            backup_dir: None,
            redirect_delay_ms: 500,
            supports_follow_up: false,
            log_filter: "clinic_desk_core=info".into(),
        }
    }
}

impl ClinicConfig {
    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.resolved_data_dir()?.join(&self.database_file))
    }

    pub fn resolved_backup_dir(&self) -> PathBuf {
        self.backup_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            supports_follow_up: self.supports_follow_up,
            redirect_delay: Duration::from_millis(self.redirect_delay_ms),
        }
    }
}

/// Loads and saves [`ClinicConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// `config.json` under the platform config dir.
    pub fn default_location() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(Self::new(dir.join(APP_DIR).join("config.json")))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Missing file means defaults.
    pub fn load(&self) -> Result<ClinicConfig, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(ClinicConfig::default())
        }
    }

    pub fn save(&self, config: &ClinicConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = self.config_path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("config.json"));
        let config = manager.load().unwrap();
        assert_eq!(config, ClinicConfig::default());
        assert!(!config.editor_settings().supports_follow_up);
        assert_eq!(
            config.editor_settings().redirect_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "supports_follow_up": true }"#).unwrap();

        let config = ConfigManager::new(path).load().unwrap();
        assert!(config.supports_follow_up);
        assert_eq!(config.database_file, "clinicdesk.db");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested").join("config.json"));
        let config = ClinicConfig {
            data_dir: Some(dir.path().join("data")),
            redirect_delay_ms: 0,
            ..ClinicConfig::default()
        };

        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(
            config.database_path().unwrap(),
            dir.path().join("data").join("clinicdesk.db")
        );
    }

    #[test]
    fn test_garbage_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            ConfigManager::new(path).load(),
            Err(ConfigError::Serde(_))
        ));
    }
}
