//! Condition catalog: the conditions users can pick and the ratings each allows.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use super::{is_json, read_structured, DataError};

/// Embedded catalog (loaded at compile time).
const BUILTIN_CATALOG_YAML: &str = include_str!("../../data/conditions.yaml");

/// Parsed embedded catalog (initialized once, reused).
static BUILTIN: OnceLock<Result<ConditionCatalog, String>> = OnceLock::new();

/// Ratings offered for conditions that are not in the catalog.
pub const CUSTOM_RATINGS: [u8; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// A condition users can claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub name: String,

    /// Body system grouping (e.g., "Musculoskeletal")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Valid ratings in ascending order
    pub ratings: Vec<u8>,

    /// Whether the condition may be claimed per side
    #[serde(default)]
    pub can_be_bilateral: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn allows(&self, rating: u8) -> bool {
        self.ratings.contains(&rating)
    }
}

/// The full set of known conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionCatalog {
    conditions: Vec<CatalogEntry>,
}

impl ConditionCatalog {
    /// Build a catalog from entries, validating them.
    pub fn new(conditions: Vec<CatalogEntry>) -> Result<Self, DataError> {
        let catalog = Self { conditions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DataError> {
        let catalog: ConditionCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let catalog: ConditionCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let catalog: ConditionCatalog = read_structured(path)?;
        catalog.validate()?;
        tracing::info!(
            path = %path.display(),
            json = is_json(path),
            conditions = catalog.len(),
            "loaded condition catalog"
        );
        Ok(catalog)
    }

    /// The catalog embedded in this crate.
    pub fn builtin() -> Result<&'static ConditionCatalog, DataError> {
        BUILTIN
            .get_or_init(|| Self::from_yaml(BUILTIN_CATALOG_YAML).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| DataError::Builtin(e.clone()))
    }

    /// Check names are unique and ratings are ascending percentages.
    fn validate(&self) -> Result<(), DataError> {
        let mut seen = HashSet::new();

        for entry in &self.conditions {
            if entry.name.trim().is_empty() {
                return Err(DataError::Validation(
                    "Catalog entry with empty name".to_string(),
                ));
            }

            if !seen.insert(entry.name.as_str()) {
                return Err(DataError::Validation(format!(
                    "Duplicate catalog entry: {}",
                    entry.name
                )));
            }

            if entry.ratings.is_empty() {
                return Err(DataError::Validation(format!(
                    "{} has no valid ratings",
                    entry.name
                )));
            }

            if entry.ratings.iter().any(|&r| r > 100) {
                return Err(DataError::Validation(format!(
                    "{} has a rating above 100%",
                    entry.name
                )));
            }

            if entry.ratings.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(DataError::Validation(format!(
                    "{} ratings must be strictly ascending",
                    entry.name
                )));
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.conditions
    }

    /// Look up an entry by exact name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.conditions.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Ratings a condition may take; custom conditions take any multiple of ten.
    pub fn valid_ratings(&self, name: &str) -> &[u8] {
        match self.get(name) {
            Some(entry) => &entry.ratings,
            None => &CUSTOM_RATINGS,
        }
    }

    pub fn is_valid_rating(&self, name: &str, rating: u8) -> bool {
        self.valid_ratings(name).contains(&rating)
    }

    /// Entries sorted by name, ignoring case.
    pub fn sorted(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.conditions.iter().collect();
        entries.sort_by_cached_key(|entry| entry.name.to_lowercase());
        entries
    }

    /// Sorted entries whose name, category or description contains `query`.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.sorted()
            .into_iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.name.to_lowercase().contains(&needle)
                    || entry
                        .category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
                    || entry
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}
