//! Plain-text renderings of a calculation result.
//!
//! [`Summary`] is the short on-screen view; [`PrintableReport`] is the full
//! printable estimate. Both render the same `CalculationResult` fields.

use chrono::NaiveDate;
use std::fmt;

use crate::trace::to_fixed;
use crate::types::{CalculationResult, DependencyStatus, RatedCondition};

const RULE_WIDTH: usize = 64;

const DISCLAIMER: &str = "This calculator is an estimation tool and is not affiliated with \
the U.S. Department of Veterans Affairs. It is based on publicly available VA regulations \
(38 CFR 4.25 & 4.26) and the compensation rates noted above. It is not an official VA tool \
and should not be considered a guarantee of benefits. For official information, please \
consult the U.S. Department of Veterans Affairs at VA.gov.";

/// Format dollars with thousands separators, e.g. `$3,831.30`.
pub fn format_currency(amount: f64) -> String {
    let fixed = to_fixed(amount.abs(), 2);
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn percent(value: f64) -> String {
    format!("{}%", to_fixed(value, 1))
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    let width = RULE_WIDTH.saturating_sub(label.len() + 2);
    writeln!(f, "  {label}{value:>width$}")
}

/// Short on-screen summary of a result.
pub struct Summary<'a> {
    pub result: &'a CalculationResult,
    pub effective: NaiveDate,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;

        writeln!(f, "Monthly Payment: {} per month", format_currency(result.monthly_compensation))?;
        writeln!(
            f,
            "Based on VA compensation rates effective {}.",
            long_date(self.effective)
        )?;
        writeln!(f)?;

        if result.has_bilateral_factor() {
            row(f, "Bilateral Factor", &percent(result.bilateral_factor))?;
        }
        row(
            f,
            "Combined Body Rating",
            &percent(result.combined_body_rating),
        )?;
        row(f, "Rounded VA Rating", &result.final_rounded_rating.to_string())?;

        writeln!(f)?;
        writeln!(f, "Calculation Steps:")?;
        for step in &result.calculation_steps {
            writeln!(f, "  - {step}")?;
        }

        Ok(())
    }
}

/// Full printable estimate: compensation, summary, conditions, breakdown.
pub struct PrintableReport<'a> {
    pub conditions: &'a [RatedCondition],
    pub result: &'a CalculationResult,
    pub status: DependencyStatus,
    pub effective: NaiveDate,

    /// Supplied by the caller so rendering stays deterministic
    pub generated_on: NaiveDate,
}

impl PrintableReport<'_> {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PrintableReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{heavy}")?;
        writeln!(f, "VA Disability Rating Estimate")?;
        writeln!(f, "Generated on: {}", self.generated_on.format("%-m/%-d/%Y"))?;
        writeln!(f, "{heavy}")?;
        writeln!(f)?;

        writeln!(f, "Estimated Monthly Compensation")?;
        writeln!(f, "  {} per month", format_currency(result.monthly_compensation))?;
        writeln!(
            f,
            "  Based on a {} rating with status: {}.",
            result.final_rounded_rating,
            self.status.label()
        )?;
        writeln!(f)?;

        writeln!(f, "Calculation Summary")?;
        writeln!(f, "{light}")?;
        row(
            f,
            "Combined Body Rating:",
            &percent(result.combined_body_rating),
        )?;
        if result.has_bilateral_factor() {
            row(
                f,
                "Bilateral Factor Bonus:",
                &percent(result.bilateral_factor),
            )?;
        }
        row(
            f,
            "Final VA Rating (Rounded):",
            &result.final_rounded_rating.to_string(),
        )?;
        writeln!(f)?;

        writeln!(f, "Your Disability Ratings")?;
        writeln!(f, "{light}")?;
        if self.conditions.is_empty() {
            writeln!(f, "  No disabilities were added.")?;
        } else {
            row(f, "Condition", "Rating")?;
            for condition in self.conditions {
                row(f, &condition.display_name(), &format!("{}%", condition.rating))?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Calculation Breakdown")?;
        writeln!(f, "{light}")?;
        for (index, step) in result.calculation_steps.iter().enumerate() {
            writeln!(f, "  {}. {}", index + 1, step)?;
        }
        writeln!(f)?;

        writeln!(f, "{light}")?;
        writeln!(
            f,
            "Compensation rates effective {}.",
            long_date(self.effective)
        )?;
        writeln!(f, "Disclaimer: {DISCLAIMER}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Laterality, RoundedRating};

    fn sample_result() -> CalculationResult {
        CalculationResult {
            bilateral_factor: 2.8,
            combined_body_rating: 65.008,
            final_rounded_rating: RoundedRating::new(70).unwrap(),
            monthly_compensation: 1908.19,
            calculation_steps: vec![
                "Starting calculation with 3 ratings.".to_string(),
                "Found bilateral pair for: Knee.".to_string(),
            ],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(175.51), "$175.51");
        assert_eq!(format_currency(3831.3), "$3,831.30");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(0.125), "$0.13");
    }

    #[test]
    fn test_report_lists_conditions_with_sides() {
        let conditions = vec![
            RatedCondition::new("c1", "Knee", 20, Laterality::Left),
            RatedCondition::new("c2", "PTSD", 50, Laterality::None),
        ];
        let result = sample_result();
        let report = PrintableReport {
            conditions: &conditions,
            result: &result,
            status: DependencyStatus::VeteranWithSpouse,
            effective: date(2024, 12, 1),
            generated_on: date(2025, 3, 7),
        }
        .render();

        assert!(report.contains("Generated on: 3/7/2025"));
        assert!(report.contains("$1,908.19 per month"));
        assert!(report.contains("Based on a 70% rating with status: Veteran with Spouse."));
        assert!(report.contains("Knee (Left)"));
        assert!(report.contains("Bilateral Factor Bonus:"));
        assert!(report.contains("  1. Starting calculation with 3 ratings."));
        assert!(report.contains("  2. Found bilateral pair for: Knee."));
        assert!(report.contains("Compensation rates effective December 1, 2024."));
    }

    #[test]
    fn test_report_without_conditions() {
        let result = CalculationResult::zero(vec!["Add a disability rating to begin.".to_string()]);
        let report = PrintableReport {
            conditions: &[],
            result: &result,
            status: DependencyStatus::VeteranOnly,
            effective: date(2024, 12, 1),
            generated_on: date(2025, 1, 1),
        }
        .render();

        assert!(report.contains("No disabilities were added."));
        assert!(!report.contains("Bilateral Factor Bonus:"));
        assert!(report.contains("$0.00 per month"));
    }

    #[test]
    fn test_summary_hides_zero_bilateral_factor() {
        let mut result = sample_result();
        let with_factor = Summary {
            result: &result,
            effective: date(2024, 12, 1),
        }
        .to_string();
        assert!(with_factor.contains("Bilateral Factor"));
        assert!(with_factor.contains("65.0%"));

        result.bilateral_factor = 0.0;
        let without = Summary {
            result: &result,
            effective: date(2024, 12, 1),
        }
        .to_string();
        assert!(!without.contains("Bilateral Factor"));
        assert!(without.contains("  - Found bilateral pair for: Knee."));
    }
}
