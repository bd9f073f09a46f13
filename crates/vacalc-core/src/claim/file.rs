//! Claim files: a YAML or JSON document listing conditions and a status.
//!
//! ```yaml
//! dependency_status: VETERAN_WITH_SPOUSE
//! conditions:
//!   - name: "Post-Traumatic Stress Disorder (PTSD)"
//!     rating: 50
//!   - name: "Limitation of Flexion of the Knee"
//!     rating: 20
//!     laterality: LEFT
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::roster::{Claim, ClaimError, ProposedCondition};
use super::schema::validate_claim_schema;
use crate::data::ConditionCatalog;
use crate::types::DependencyStatus;

/// Errors that can occur when reading a claim file.
#[derive(Error, Debug)]
pub enum ClaimFileError {
    #[error("Failed to read claim file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Claim does not match schema: {}", .0.join("; "))]
    Schema(Vec<String>),

    #[error("Claim schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("Condition #{index} ({name}) rejected: {source}")]
    Rejected {
        index: usize,
        name: String,
        source: ClaimError,
    },
}

/// The on-disk shape of a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFile {
    /// Household status; `None` lets the caller pick a default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_status: Option<DependencyStatus>,

    pub conditions: Vec<ProposedCondition>,
}

impl ClaimFile {
    /// Validate a parsed document against the claim schema, then deserialize it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ClaimFileError> {
        validate_claim_schema(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a claim from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ClaimFileError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a claim from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ClaimFileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load a claim from a `.json` file, or YAML for any other extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClaimFileError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ClaimFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if crate::data::is_json(path) {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Admit every listed condition into a fresh claim, in file order.
    ///
    /// A file without a status yields a `VETERAN_ONLY` claim.
    pub fn into_claim(self, catalog: &ConditionCatalog) -> Result<Claim<'_>, ClaimFileError> {
        let mut claim = Claim::new(catalog).with_status(self.dependency_status.unwrap_or_default());

        for (position, proposed) in self.conditions.into_iter().enumerate() {
            let name = proposed.name.clone();
            claim
                .add(proposed)
                .map_err(|source| ClaimFileError::Rejected {
                    index: position + 1,
                    name,
                    source,
                })?;
        }

        Ok(claim)
    }
}

impl From<&Claim<'_>> for ClaimFile {
    fn from(claim: &Claim<'_>) -> Self {
        Self {
            dependency_status: Some(claim.status()),
            conditions: claim
                .conditions()
                .iter()
                .map(|c| ProposedCondition::new(c.name.clone(), c.rating, c.laterality))
                .collect(),
        }
    }
}
