//! The claim roster: the caller-owned list of rated conditions.
//!
//! The calculator trusts its input. Everything that keeps the list sensible
//! (catalog ratings, allowed sides, duplicates, the single mental-health
//! rating) is checked here, before a condition is admitted.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::data::ConditionCatalog;
use crate::types::{DependencyStatus, Laterality, RatedCondition};

lazy_static! {
    /// Conditions the VA rates together as one mental-health rating.
    pub static ref MENTAL_HEALTH_CONDITIONS: HashSet<&'static str> = [
        "Post-Traumatic Stress Disorder (PTSD)",
        "Major Depressive Disorder",
        "Generalized Anxiety Disorder",
        "Somatic Symptom Disorder",
        "Adjustment Disorder",
        "Bipolar Disorder",
    ]
    .into_iter()
    .collect();
}

pub fn is_mental_health(name: &str) -> bool {
    MENTAL_HEALTH_CONDITIONS.contains(name)
}

/// Reasons a proposed condition is not admitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Condition name must not be empty")]
    EmptyName,

    #[error("{rating}% is not a valid rating for {name} (valid: {valid})")]
    InvalidRating {
        name: String,
        rating: u8,
        valid: String,
    },

    #[error("{name} cannot be claimed on a specific side")]
    SideNotAllowed { name: String },

    #[error("This specific condition (with side) has already been added: {name} ({side})")]
    Duplicate { name: String, side: &'static str },

    #[error("Only one mental health condition can be rated. The VA combines them into a single rating.")]
    SecondMentalHealth { name: String },
}

/// A condition the user wants to add, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedCondition {
    pub name: String,
    pub rating: u8,

    #[serde(default)]
    pub laterality: Laterality,
}

impl ProposedCondition {
    pub fn new(name: impl Into<String>, rating: u8, laterality: Laterality) -> Self {
        Self {
            name: name.into(),
            rating,
            laterality,
        }
    }
}

/// An ordered set of rated conditions plus the dependency status.
#[derive(Debug, Clone)]
pub struct Claim<'a> {
    catalog: &'a ConditionCatalog,
    conditions: Vec<RatedCondition>,
    status: DependencyStatus,
    next_id: u64,
}

impl<'a> Claim<'a> {
    pub fn new(catalog: &'a ConditionCatalog) -> Self {
        Self {
            catalog,
            conditions: Vec::new(),
            status: DependencyStatus::default(),
            next_id: 1,
        }
    }

    pub fn with_status(mut self, status: DependencyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn conditions(&self) -> &[RatedCondition] {
        &self.conditions
    }

    pub fn status(&self) -> DependencyStatus {
        self.status
    }

    pub fn set_status(&mut self, status: DependencyStatus) {
        self.status = status;
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check a proposal against the catalog and the current list.
    pub fn check(&self, proposed: &ProposedCondition) -> Result<(), ClaimError> {
        let name = proposed.name.trim();
        if name.is_empty() {
            return Err(ClaimError::EmptyName);
        }

        let valid = self.catalog.valid_ratings(name);
        if !valid.contains(&proposed.rating) {
            return Err(ClaimError::InvalidRating {
                name: name.to_string(),
                rating: proposed.rating,
                valid: valid
                    .iter()
                    .map(|r| format!("{r}%"))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        if let Some(entry) = self.catalog.get(name) {
            if !entry.can_be_bilateral && proposed.laterality.is_lateral() {
                return Err(ClaimError::SideNotAllowed {
                    name: name.to_string(),
                });
            }
        }

        // Repeats without a side are allowed
        if proposed.laterality.is_lateral()
            && self
                .conditions
                .iter()
                .any(|c| c.name == name && c.laterality == proposed.laterality)
        {
            return Err(ClaimError::Duplicate {
                name: name.to_string(),
                side: proposed.laterality.label(),
            });
        }

        if is_mental_health(name) && self.conditions.iter().any(|c| is_mental_health(&c.name)) {
            return Err(ClaimError::SecondMentalHealth {
                name: name.to_string(),
            });
        }

        Ok(())
    }

    /// Admit a condition, assigning it the next id.
    pub fn add(&mut self, proposed: ProposedCondition) -> Result<&RatedCondition, ClaimError> {
        self.check(&proposed)?;

        let id = format!("c{}", self.next_id);
        self.next_id += 1;

        let condition = RatedCondition::new(
            id,
            proposed.name.trim(),
            proposed.rating,
            proposed.laterality,
        );
        tracing::debug!(id = %condition.id, name = %condition.name, rating = condition.rating, "condition added");
        self.conditions.push(condition);

        Ok(&self.conditions[self.conditions.len() - 1])
    }

    /// Remove a condition by id.
    pub fn remove(&mut self, id: &str) -> Option<RatedCondition> {
        let position = self.conditions.iter().position(|c| c.id == id)?;
        Some(self.conditions.remove(position))
    }

    /// Clear all conditions and restore the default status.
    pub fn reset(&mut self) {
        self.conditions.clear();
        self.status = DependencyStatus::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNEE: &str = "Limitation of Flexion of the Knee";
    const PTSD: &str = "Post-Traumatic Stress Disorder (PTSD)";

    fn catalog() -> &'static ConditionCatalog {
        ConditionCatalog::builtin().unwrap()
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut claim = Claim::new(catalog());
        let first = claim
            .add(ProposedCondition::new("Tinnitus", 10, Laterality::None))
            .unwrap()
            .id
            .clone();
        let second = claim
            .add(ProposedCondition::new(KNEE, 10, Laterality::Left))
            .unwrap()
            .id
            .clone();

        assert_eq!(first, "c1");
        assert_eq!(second, "c2");
        assert_eq!(claim.len(), 2);
    }

    #[test]
    fn test_rating_must_be_in_catalog_set() {
        let mut claim = Claim::new(catalog());
        let err = claim
            .add(ProposedCondition::new("Tinnitus", 20, Laterality::None))
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidRating { rating: 20, .. }));
        assert!(err.to_string().contains("valid: 10%"));
    }

    #[test]
    fn test_custom_condition_takes_any_multiple_of_ten_and_side() {
        let mut claim = Claim::new(catalog());
        claim
            .add(ProposedCondition::new("  Ankle Instability ", 70, Laterality::Right))
            .unwrap();
        assert_eq!(claim.conditions()[0].name, "Ankle Instability");

        let err = claim
            .add(ProposedCondition::new("Wrist Ganglion", 15, Laterality::None))
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidRating { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut claim = Claim::new(catalog());
        assert_eq!(
            claim.add(ProposedCondition::new("   ", 10, Laterality::None)).unwrap_err(),
            ClaimError::EmptyName
        );
    }

    #[test]
    fn test_side_only_for_bilateral_conditions() {
        let mut claim = Claim::new(catalog());
        let err = claim
            .add(ProposedCondition::new("Tinnitus", 10, Laterality::Left))
            .unwrap_err();
        assert!(matches!(err, ClaimError::SideNotAllowed { .. }));

        claim
            .add(ProposedCondition::new(KNEE, 10, Laterality::None))
            .unwrap();
    }

    #[test]
    fn test_duplicate_side_rejected_but_unsided_repeats_allowed() {
        let mut claim = Claim::new(catalog());
        claim.add(ProposedCondition::new(KNEE, 10, Laterality::Left)).unwrap();

        let err = claim
            .add(ProposedCondition::new(KNEE, 20, Laterality::Left))
            .unwrap_err();
        assert_eq!(
            err,
            ClaimError::Duplicate {
                name: KNEE.to_string(),
                side: "Left"
            }
        );

        claim.add(ProposedCondition::new(KNEE, 20, Laterality::Right)).unwrap();
        claim.add(ProposedCondition::new(KNEE, 10, Laterality::None)).unwrap();
        claim.add(ProposedCondition::new(KNEE, 10, Laterality::None)).unwrap();
        assert_eq!(claim.len(), 4);
    }

    #[test]
    fn test_only_one_mental_health_condition() {
        let mut claim = Claim::new(catalog());
        claim.add(ProposedCondition::new(PTSD, 70, Laterality::None)).unwrap();

        let err = claim
            .add(ProposedCondition::new("Major Depressive Disorder", 30, Laterality::None))
            .unwrap_err();
        assert!(matches!(err, ClaimError::SecondMentalHealth { .. }));
    }

    #[test]
    fn test_remove_and_reset() {
        let mut claim = Claim::new(catalog()).with_status(DependencyStatus::VeteranWithSpouse);
        claim.add(ProposedCondition::new("Tinnitus", 10, Laterality::None)).unwrap();
        claim.add(ProposedCondition::new(PTSD, 50, Laterality::None)).unwrap();

        let removed = claim.remove("c1").unwrap();
        assert_eq!(removed.name, "Tinnitus");
        assert!(claim.remove("c1").is_none());
        assert_eq!(claim.len(), 1);

        claim.reset();
        assert!(claim.is_empty());
        assert_eq!(claim.status(), DependencyStatus::VeteranOnly);
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut claim = Claim::new(catalog());
        claim.add(ProposedCondition::new("Tinnitus", 10, Laterality::None)).unwrap();
        claim.remove("c1");
        let id = claim
            .add(ProposedCondition::new("Tinnitus", 10, Laterality::None))
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "c2");
    }
}
