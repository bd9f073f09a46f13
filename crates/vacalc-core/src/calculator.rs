//! Calculator: turns rated conditions into a combined rating and compensation.
//!
//! The calculation is a single pass with no failure mode:
//! 1. Split ratings into non-bilateral ratings and bilateral pairs
//! 2. Combine pair ratings and take 10% of that as the bilateral factor
//! 3. Combine everything, largest first
//! 4. Round to the nearest 10%
//! 5. Look up the monthly amount (0 when not tabulated)
//!
//! Edge cases (no input, unpaired limbs, nothing left to combine) produce a
//! zero result with an explanatory step instead of an error.

use std::sync::Arc;

use crate::bilateral::partition;
use crate::combine::{fold, sort_descending};
use crate::data::CompensationTable;
use crate::trace::{CalculationTrace, TraceStep};
use crate::types::{CalculationResult, DependencyStatus, RatedCondition, RoundedRating};

/// Share of the combined pair rating added as the bilateral factor.
pub const BILATERAL_FACTOR_SHARE: f64 = 0.10;

/// Stateless rating calculator bound to a compensation table.
#[derive(Debug, Clone)]
pub struct Calculator {
    rates: Arc<CompensationTable>,
}

impl Calculator {
    pub fn new(rates: Arc<CompensationTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &CompensationTable {
        &self.rates
    }

    /// Calculate the combined rating and compensation.
    ///
    /// # Arguments
    ///
    /// * `conditions` - Rated conditions, trusted to be well formed
    /// * `status` - Household composition used for the compensation lookup
    ///
    /// # Returns
    ///
    /// A fresh `CalculationResult`; identical input always yields an
    /// identical result, trace text included.
    pub fn calculate(
        &self,
        conditions: &[RatedCondition],
        status: DependencyStatus,
    ) -> CalculationResult {
        let mut trace = CalculationTrace::new();

        if conditions.is_empty() {
            trace.record(TraceStep::NothingToCalculate);
            return CalculationResult::zero(trace.into_lines());
        }

        trace.record(TraceStep::Started {
            count: conditions.len(),
        });

        let split = partition(conditions, &mut trace);

        let (bilateral_combined, bilateral_factor) = if split.has_pairs() {
            let mut pairs = split.bilateral_pairs.clone();
            pairs.sort_unstable_by(|a, b| b.cmp(a));
            trace.record(TraceStep::CombiningPairs {
                ratings: pairs.clone(),
            });

            let pair_values: Vec<f64> = pairs.iter().map(|&r| f64::from(r)).collect();
            let combined = fold(&pair_values).total;
            trace.record(TraceStep::BilateralCombined { value: combined });

            let factor = combined * BILATERAL_FACTOR_SHARE;
            trace.record(TraceStep::BilateralFactor { value: factor });
            (combined, factor)
        } else {
            trace.record(TraceStep::NoBilateralPairs);
            (0.0, 0.0)
        };

        let mut ratings: Vec<f64> = split
            .non_bilateral
            .iter()
            .map(|&r| f64::from(r))
            .collect();
        if bilateral_combined > 0.0 {
            ratings.push(bilateral_combined);
        }
        if bilateral_factor > 0.0 {
            ratings.push(bilateral_factor);
        }

        if ratings.is_empty() {
            tracing::warn!(
                conditions = conditions.len(),
                "no ratings left to combine, returning zero result"
            );
            trace.record(TraceStep::NoRatingsToCombine);
            return CalculationResult::zero(trace.into_lines());
        }

        sort_descending(&mut ratings);
        trace.record(TraceStep::FinalRatings {
            ratings: ratings.clone(),
        });

        let folded = fold(&ratings);
        for step in &folded.steps {
            tracing::trace!(step = %step, "combined rating");
        }
        let combined_body_rating = folded.total;
        trace.record(TraceStep::CombinedBodyRating {
            value: combined_body_rating,
        });

        let final_rounded_rating = RoundedRating::nearest(combined_body_rating);
        trace.record(TraceStep::Rounded {
            combined: combined_body_rating,
            rounded: final_rounded_rating,
        });

        let monthly_compensation = self.rates.lookup(final_rounded_rating, status);
        trace.record(TraceStep::Compensation {
            rating: final_rounded_rating,
            amount: monthly_compensation,
        });

        tracing::debug!(
            combined = combined_body_rating,
            rounded = final_rounded_rating.value(),
            bilateral_factor,
            status = %status,
            monthly_compensation,
            "calculation complete"
        );

        CalculationResult {
            bilateral_factor,
            combined_body_rating,
            final_rounded_rating,
            monthly_compensation,
            calculation_steps: trace.into_lines(),
        }
    }

    /// Calculate the same conditions under every dependency status.
    pub fn compare_statuses(
        &self,
        conditions: &[RatedCondition],
    ) -> Vec<(DependencyStatus, CalculationResult)> {
        DependencyStatus::ALL
            .into_iter()
            .map(|status| (status, self.calculate(conditions, status)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Laterality;
    use chrono::NaiveDate;

    fn calculator() -> Calculator {
        Calculator::new(Arc::new(CompensationTable::builtin().unwrap().clone()))
    }

    fn condition(id: &str, name: &str, rating: u8, laterality: Laterality) -> RatedCondition {
        RatedCondition::new(id, name, rating, laterality)
    }

    #[test]
    fn test_empty_input_yields_zero_result() {
        let result = calculator().calculate(&[], DependencyStatus::VeteranOnly);

        assert_eq!(result.bilateral_factor, 0.0);
        assert_eq!(result.combined_body_rating, 0.0);
        assert_eq!(result.final_rounded_rating, RoundedRating::ZERO);
        assert_eq!(result.monthly_compensation, 0.0);
        assert_eq!(result.calculation_steps, vec!["Add a disability rating to begin."]);
    }

    #[test]
    fn test_two_plain_ratings() {
        let conditions = vec![
            condition("1", "PTSD", 70, Laterality::None),
            condition("2", "Back Strain", 20, Laterality::None),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert!((result.combined_body_rating - 76.0).abs() < 1e-9);
        assert_eq!(result.final_rounded_rating.value(), 80);
        assert_eq!(result.bilateral_factor, 0.0);
        assert_eq!(result.monthly_compensation, 2044.89);
        assert_eq!(
            result.calculation_steps,
            vec![
                "Starting calculation with 2 ratings.",
                "No bilateral pairs found. No bilateral factor to apply.",
                "Final ratings to combine (sorted): 70.0%, 20.0%",
                "Combined Body Rating = 76.0%",
                "Rounding 76.0% to the nearest 10% = 80%",
                "Monthly compensation for 80% rating: $2044.89",
            ]
        );
    }

    #[test]
    fn test_bilateral_pair_adds_factor() {
        let conditions = vec![
            condition("1", "Knee", 20, Laterality::Left),
            condition("2", "Knee", 10, Laterality::Right),
            condition("3", "PTSD", 50, Laterality::None),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranWithSpouse);

        assert!((result.bilateral_factor - 2.8).abs() < 1e-9);
        assert_eq!(result.final_rounded_rating.value(), 70);
        assert_eq!(result.monthly_compensation, 1908.19);
        assert_eq!(
            result.calculation_steps,
            vec![
                "Starting calculation with 3 ratings.",
                "Found bilateral pair for: Knee.",
                "Combining bilateral pair ratings (20%, 10%) for bilateral factor.",
                "Combined bilateral rating = 28.0%",
                "Bilateral factor (10% of combined) = 2.8%",
                "Final ratings to combine (sorted): 50.0%, 28.0%, 2.8%",
                "Combined Body Rating = 65.0%",
                "Rounding 65.0% to the nearest 10% = 70%",
                "Monthly compensation for 70% rating: $1908.19",
            ]
        );
    }

    #[test]
    fn test_combined_rating_on_half_step_rounds_up_in_trace() {
        let conditions = vec![
            condition("1", "PTSD", 50, Laterality::None),
            condition("2", "Migraine", 50, Laterality::None),
            condition("3", "Back Strain", 30, Laterality::None),
            condition("4", "Tinnitus", 10, Laterality::None),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.combined_body_rating, 84.25);
        assert_eq!(result.final_rounded_rating.value(), 80);
        assert_eq!(
            result.calculation_steps,
            vec![
                "Starting calculation with 4 ratings.",
                "No bilateral pairs found. No bilateral factor to apply.",
                "Final ratings to combine (sorted): 50.0%, 50.0%, 30.0%, 10.0%",
                "Combined Body Rating = 84.3%",
                "Rounding 84.3% to the nearest 10% = 80%",
                "Monthly compensation for 80% rating: $2044.89",
            ]
        );
    }

    #[test]
    fn test_bilateral_factor_on_half_step_rounds_up_in_trace() {
        let conditions = vec![
            condition("1", "Shoulder", 50, Laterality::Left),
            condition("2", "Shoulder", 50, Laterality::Right),
            condition("3", "Shoulder", 50, Laterality::Left),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.bilateral_factor, 8.75);
        assert_eq!(result.combined_body_rating, 88.59375);
        assert_eq!(result.final_rounded_rating.value(), 90);
        assert_eq!(
            result.calculation_steps,
            vec![
                "Starting calculation with 3 ratings.",
                "Found bilateral pair for: Shoulder.",
                "Combining bilateral pair ratings (50%, 50%, 50%) for bilateral factor.",
                "Combined bilateral rating = 87.5%",
                "Bilateral factor (10% of combined) = 8.8%",
                "Final ratings to combine (sorted): 87.5%, 8.8%",
                "Combined Body Rating = 88.6%",
                "Rounding 88.6% to the nearest 10% = 90%",
                "Monthly compensation for 90% rating: $2297.96",
            ]
        );
    }

    #[test]
    fn test_unpaired_limb_is_plain_rating() {
        let conditions = vec![condition("1", "Knee Pain", 20, Laterality::Left)];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.bilateral_factor, 0.0);
        assert!((result.combined_body_rating - 20.0).abs() < 1e-9);
        assert_eq!(result.final_rounded_rating.value(), 20);
        assert_eq!(result.monthly_compensation, 346.95);
        assert_eq!(
            result.calculation_steps[1],
            "Treating Knee Pain (Left) as a non-bilateral rating as it has no pair."
        );
    }

    #[test]
    fn test_zero_rated_pair_leaves_nothing_to_combine() {
        let conditions = vec![
            condition("1", "Hearing Loss", 0, Laterality::Left),
            condition("2", "Hearing Loss", 0, Laterality::Right),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.final_rounded_rating, RoundedRating::ZERO);
        assert_eq!(result.monthly_compensation, 0.0);
        assert_eq!(
            result.calculation_steps.last().map(String::as_str),
            Some("No ratings available for final combination.")
        );
    }

    #[test]
    fn test_zero_rated_plain_condition_still_combines() {
        let conditions = vec![condition("1", "Erectile Dysfunction (ED)", 0, Laterality::None)];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.combined_body_rating, 0.0);
        assert_eq!(
            result.calculation_steps.last().map(String::as_str),
            Some("Monthly compensation for 0% rating: $0.00")
        );
    }

    #[test]
    fn test_duplicates_are_both_combined() {
        let conditions = vec![
            condition("1", "Knee", 10, Laterality::Left),
            condition("2", "Knee", 10, Laterality::Left),
        ];
        let result = calculator().calculate(&conditions, DependencyStatus::VeteranOnly);
        assert!((result.combined_body_rating - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_table_entry_resolves_to_zero() {
        let table = CompensationTable::empty(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        let calculator = Calculator::new(Arc::new(table));
        let conditions = vec![condition("1", "Tinnitus", 10, Laterality::None)];
        let result = calculator.calculate(&conditions, DependencyStatus::VeteranOnly);

        assert_eq!(result.final_rounded_rating.value(), 10);
        assert_eq!(result.monthly_compensation, 0.0);
    }

    #[test]
    fn test_compare_statuses_covers_all_six() {
        let conditions = vec![condition("1", "PTSD", 70, Laterality::None)];
        let rows = calculator().compare_statuses(&conditions);

        assert_eq!(rows.len(), 6);
        assert!(rows
            .iter()
            .all(|(_, result)| result.final_rounded_rating.value() == 70));
        assert_eq!(rows[0].0, DependencyStatus::VeteranOnly);
    }
}
