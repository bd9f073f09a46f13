//! Estimator configuration.
//!
//! ```yaml
//! catalog_path: data/conditions.yaml
//! rates_path: data/rates-2025.yaml
//! default_status: VETERAN_WITH_SPOUSE
//! log_level: debug
//! cache:
//!   max_entries: 500
//!   ttl_secs: 600
//! ```
//!
//! Every field is optional. Unset data paths fall back to the embedded data.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::data::{CompensationTable, ConditionCatalog, DataError};
use crate::types::DependencyStatus;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Memoization cache bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl_secs: 3_600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacalcConfig {
    /// Replacement condition catalog (YAML or JSON)
    pub catalog_path: Option<PathBuf>,

    /// Replacement compensation table (YAML or JSON)
    pub rates_path: Option<PathBuf>,

    pub default_status: DependencyStatus,

    /// Log level used when no filter is set in the environment
    pub log_level: String,

    pub cache: CacheSettings,
}

impl Default for VacalcConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            rates_path: None,
            default_status: DependencyStatus::VeteranOnly,
            log_level: "warn".to_string(),
            cache: CacheSettings::default(),
        }
    }
}

impl VacalcConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: VacalcConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// Relative data paths are resolved against the config file's directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_yaml(&contents)?;
        if let Some(base) = path.parent() {
            config.catalog_path = config.catalog_path.map(|p| base.join(p));
            config.rates_path = config.rates_path.map(|p| base.join(p));
        }

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured catalog, or the embedded one.
    pub fn load_catalog(&self) -> Result<Arc<ConditionCatalog>, ConfigError> {
        let catalog = match &self.catalog_path {
            Some(path) => ConditionCatalog::from_file(path)?,
            None => ConditionCatalog::builtin()?.clone(),
        };
        Ok(Arc::new(catalog))
    }

    /// The configured compensation table, or the embedded one.
    pub fn load_rates(&self) -> Result<Arc<CompensationTable>, ConfigError> {
        let table = match &self.rates_path {
            Some(path) => CompensationTable::from_file(path)?,
            None => CompensationTable::builtin()?.clone(),
        };
        Ok(Arc::new(table))
    }
}
