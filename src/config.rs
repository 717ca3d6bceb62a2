use std::{fs, path::{Path, PathBuf}, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::core::limits::{
    DEFAULT_AUTOSAVE_INTERVAL_SECS, DEFAULT_LOG_LEVEL, DEFAULT_MAX_TRACKED_FILES,
    DEFAULT_STATE_FILE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Runtime settings for controller state tracking. Every field is optional in the JSON source.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PersistConfig {
    pub max_tracked_files: usize,
    pub state_path: PathBuf,
    pub autosave_interval_secs: u64,
    pub log_level: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            max_tracked_files: DEFAULT_MAX_TRACKED_FILES,
            state_path: PathBuf::from(DEFAULT_STATE_FILE),
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl PersistConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tracked_files == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tracked_files",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.autosave_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "autosave_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
