//! Compensation table: monthly amounts by rounded rating and dependency status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use super::{read_structured, DataError};
use crate::types::{DependencyStatus, RoundedRating};

/// Embedded rate table (loaded at compile time).
const BUILTIN_RATES_YAML: &str = include_str!("../../data/compensation_rates.yaml");

/// Parsed embedded rate table (initialized once, reused).
static BUILTIN: OnceLock<Result<CompensationTable, String>> = OnceLock::new();

/// Monthly amounts for one rating, one field per dependency status.
///
/// A missing field means the amount is not tabulated and resolves to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusRates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_only: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_with_spouse: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_with_spouse_and_child: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_with_child: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_with_spouse_and_two_children: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veteran_with_two_children: Option<f64>,
}

impl StatusRates {
    /// Same amount for every status (10% and 20% ratings).
    pub fn flat(amount: f64) -> Self {
        Self {
            veteran_only: Some(amount),
            veteran_with_spouse: Some(amount),
            veteran_with_spouse_and_child: Some(amount),
            veteran_with_child: Some(amount),
            veteran_with_spouse_and_two_children: Some(amount),
            veteran_with_two_children: Some(amount),
        }
    }

    pub fn get(&self, status: DependencyStatus) -> Option<f64> {
        match status {
            DependencyStatus::VeteranOnly => self.veteran_only,
            DependencyStatus::VeteranWithSpouse => self.veteran_with_spouse,
            DependencyStatus::VeteranWithSpouseAndChild => self.veteran_with_spouse_and_child,
            DependencyStatus::VeteranWithChild => self.veteran_with_child,
            DependencyStatus::VeteranWithSpouseAndTwoChildren => {
                self.veteran_with_spouse_and_two_children
            }
            DependencyStatus::VeteranWithTwoChildren => self.veteran_with_two_children,
        }
    }

    pub fn set(&mut self, status: DependencyStatus, amount: f64) {
        let slot = match status {
            DependencyStatus::VeteranOnly => &mut self.veteran_only,
            DependencyStatus::VeteranWithSpouse => &mut self.veteran_with_spouse,
            DependencyStatus::VeteranWithSpouseAndChild => &mut self.veteran_with_spouse_and_child,
            DependencyStatus::VeteranWithChild => &mut self.veteran_with_child,
            DependencyStatus::VeteranWithSpouseAndTwoChildren => {
                &mut self.veteran_with_spouse_and_two_children
            }
            DependencyStatus::VeteranWithTwoChildren => &mut self.veteran_with_two_children,
        };
        *slot = Some(amount);
    }
}

/// Monthly compensation keyed by rounded rating, then dependency status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationTable {
    /// Date the amounts took effect
    pub effective: NaiveDate,

    /// Where the amounts come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub rates: BTreeMap<RoundedRating, StatusRates>,
}

impl CompensationTable {
    /// An empty table; every lookup resolves to 0.
    pub fn empty(effective: NaiveDate) -> Self {
        Self {
            effective,
            source: None,
            rates: BTreeMap::new(),
        }
    }

    /// Parse a table from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DataError> {
        let table: CompensationTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Parse a table from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let table: CompensationTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let table: CompensationTable = read_structured(path)?;
        table.validate()?;
        tracing::info!(
            path = %path.display(),
            effective = %table.effective,
            ratings = table.rates.len(),
            "loaded compensation table"
        );
        Ok(table)
    }

    /// The table embedded in this crate.
    pub fn builtin() -> Result<&'static CompensationTable, DataError> {
        BUILTIN
            .get_or_init(|| Self::from_yaml(BUILTIN_RATES_YAML).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| DataError::Builtin(e.clone()))
    }

    /// Amounts must be finite and non-negative.
    fn validate(&self) -> Result<(), DataError> {
        for (rating, row) in &self.rates {
            for status in DependencyStatus::ALL {
                if let Some(amount) = row.get(status) {
                    if !amount.is_finite() || amount < 0.0 {
                        return Err(DataError::Validation(format!(
                            "Invalid amount {} for {} / {}",
                            amount, rating, status
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Set one amount, creating the row when needed.
    pub fn insert(&mut self, rating: RoundedRating, status: DependencyStatus, amount: f64) {
        self.rates.entry(rating).or_default().set(status, amount);
    }

    /// Monthly amount for a rating and status; untabulated pairs resolve to 0.
    pub fn lookup(&self, rating: RoundedRating, status: DependencyStatus) -> f64 {
        match self.rates.get(&rating).and_then(|row| row.get(status)) {
            Some(amount) => amount,
            None => {
                if rating != RoundedRating::ZERO {
                    tracing::warn!(rating = rating.value(), status = %status, "no tabulated amount");
                }
                0.0
            }
        }
    }

    /// Rows in ascending rating order.
    pub fn rows(&self) -> impl Iterator<Item = (RoundedRating, &StatusRates)> {
        self.rates.iter().map(|(rating, row)| (*rating, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: u8) -> RoundedRating {
        RoundedRating::new(value).unwrap()
    }

    #[test]
    fn test_builtin_table_loads() {
        let table = CompensationTable::builtin().unwrap();
        assert_eq!(table.effective, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(table.rows().count(), 10);
        assert_eq!(
            table.lookup(rating(80), DependencyStatus::VeteranOnly),
            2044.89
        );
        assert_eq!(
            table.lookup(rating(50), DependencyStatus::VeteranWithSpouse),
            1208.04
        );
    }

    #[test]
    fn test_every_status_is_tabulated_above_zero() {
        let table = CompensationTable::builtin().unwrap();
        for bucket in RoundedRating::all().skip(1) {
            for status in DependencyStatus::ALL {
                assert!(
                    table.lookup(bucket, status) > 0.0,
                    "missing {} / {}",
                    bucket,
                    status
                );
            }
        }
    }

    #[test]
    fn test_dependents_never_pay_less() {
        let table = CompensationTable::builtin().unwrap();
        for (_, row) in table.rows() {
            let alone = row.get(DependencyStatus::VeteranOnly).unwrap();
            for status in DependencyStatus::ALL {
                assert!(row.get(status).unwrap() >= alone);
            }
        }
    }

    #[test]
    fn test_missing_entries_resolve_to_zero() {
        let table = CompensationTable::builtin().unwrap();
        assert_eq!(table.lookup(RoundedRating::ZERO, DependencyStatus::VeteranOnly), 0.0);

        let mut sparse = CompensationTable::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        sparse.insert(rating(30), DependencyStatus::VeteranOnly, 500.0);
        assert_eq!(sparse.lookup(rating(30), DependencyStatus::VeteranOnly), 500.0);
        assert_eq!(sparse.lookup(rating(30), DependencyStatus::VeteranWithSpouse), 0.0);
        assert_eq!(sparse.lookup(rating(40), DependencyStatus::VeteranOnly), 0.0);
    }

    #[test]
    fn test_off_bucket_rating_keys_rejected() {
        let yaml = r#"
effective: "2024-12-01"
rates:
  35:
    VETERAN_ONLY: 100.0
"#;
        assert!(matches!(
            CompensationTable::from_yaml(yaml),
            Err(DataError::Yaml(_))
        ));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let yaml = r#"
effective: "2024-12-01"
rates:
  30:
    VETERAN_ONLY: -1.0
"#;
        assert!(matches!(
            CompensationTable::from_yaml(yaml),
            Err(DataError::Validation(_))
        ));
    }

    #[test]
    fn test_flat_row() {
        let row = StatusRates::flat(175.51);
        assert!(DependencyStatus::ALL
            .iter()
            .all(|status| row.get(*status) == Some(175.51)));
    }
}
