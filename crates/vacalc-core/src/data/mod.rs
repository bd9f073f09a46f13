//! Static reference data: the condition catalog and the compensation table.
//!
//! Both ship embedded in the crate and can be replaced at startup from YAML
//! or JSON files. Neither is mutated after loading.

mod catalog;
mod rates;

pub use catalog::{CatalogEntry, ConditionCatalog, CUSTOM_RATINGS};
pub use rates::{CompensationTable, StatusRates};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading reference data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data validation failed: {0}")]
    Validation(String),

    #[error("Embedded data is unusable: {0}")]
    Builtin(String),
}

/// Read a file as JSON when it has a `.json` extension, YAML otherwise.
pub(crate) fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let contents = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if is_json(path) {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(serde_yaml::from_str(&contents)?)
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
