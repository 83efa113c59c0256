//! Store configuration.
//!
//! Hosts either build `StoreConfig` in code or load it from a JSON document.
//! Unknown keys are rejected so a typo never silently falls back to defaults.

use crate::logging::{default_log_level, init_logging, normalize_level};
use crate::model::submission_dates::DateOrderPolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Runtime settings for the date attribute store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Ordering rule for milestone dates. Defaults to unchecked.
    pub order_policy: DateOrderPolicy,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            order_policy: DateOrderPolicy::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }

    /// Starts file logging when `log_dir` is set; no-op otherwise.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let Some(dir) = &self.log_dir else {
            return Ok(());
        };
        let dir = dir
            .to_str()
            .ok_or_else(|| ConfigError::Logging("log_dir must be valid UTF-8".to_string()))?;
        init_logging(&self.log_level, dir).map_err(ConfigError::Logging)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
    Logging(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid store config: {message}"),
            Self::InvalidLogLevel(value) => write!(f, "unsupported log level `{value}`"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be an absolute path, got `{}`", path.display())
            }
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
        }
    }
}

impl Error for ConfigError {}
