//! # vacalc-core
//!
//! Deterministic VA combined disability rating estimator.
//!
//! This crate answers, for a set of rated conditions:
//! - What is the combined body rating?
//! - What does it round to?
//! - What is the monthly compensation for a given household?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output, trace included
//! 2. **Total**: The calculation never fails; edge cases degrade to zero results
//! 3. **Traceable**: Every result carries the ordered steps that produced it
//!
//! ## Example
//!
//! ```rust,ignore
//! use vacalc_core::{calculate, ClaimFile, ConditionCatalog};
//!
//! let catalog = ConditionCatalog::builtin()?;
//! let claim = ClaimFile::from_file("claim.yaml")?.into_claim(catalog)?;
//! let result = calculate(claim.conditions(), claim.status())?;
//!
//! println!("{} -> {}", result.combined_body_rating, result.final_rounded_rating);
//! for step in &result.calculation_steps {
//!     println!("  {step}");
//! }
//! ```

pub mod bilateral;
pub mod calculator;
pub mod claim;
pub mod combine;
pub mod config;
pub mod data;
pub mod normalize;
pub mod report;
pub mod trace;
pub mod types;

// Re-export main types at crate root
pub use calculator::{Calculator, BILATERAL_FACTOR_SHARE};
pub use claim::{Claim, ClaimError, ClaimFile, ClaimFileError, ProposedCondition};
pub use combine::combine;
pub use config::{CacheSettings, ConfigError, VacalcConfig};
pub use data::{CatalogEntry, CompensationTable, ConditionCatalog, DataError, StatusRates};
pub use report::{format_currency, PrintableReport, Summary};
pub use trace::to_fixed;
pub use types::{
    CalculationResult, DependencyStatus, Laterality, ParseEnumError, RatedCondition,
    RoundedRating,
};

use std::sync::{Arc, OnceLock};

/// Calculate a result against the embedded compensation table.
///
/// This is the main entry point for one-off calculations. Callers that load
/// their own table should build a [`Calculator`] instead.
///
/// # Errors
///
/// Only fails if the embedded table cannot be loaded; the calculation
/// itself is total.
pub fn calculate(
    conditions: &[RatedCondition],
    status: DependencyStatus,
) -> Result<CalculationResult, DataError> {
    static CALCULATOR: OnceLock<Calculator> = OnceLock::new();

    let calculator = match CALCULATOR.get() {
        Some(calculator) => calculator,
        None => {
            let table = CompensationTable::builtin()?;
            CALCULATOR.get_or_init(|| Calculator::new(Arc::new(table.clone())))
        }
    };

    Ok(calculator.calculate(conditions, status))
}
