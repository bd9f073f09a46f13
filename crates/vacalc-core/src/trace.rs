//! Calculation trace.
//!
//! Every stage of a calculation records what it did as a [`TraceStep`].
//! Steps render to fixed text (one decimal for percentages, two for dollars)
//! so the same input always yields byte-identical explanations. Decimals go
//! through [`to_fixed`], which settles exact halves upward.

use std::fmt;

use crate::normalize::capitalize;
use crate::types::{Laterality, RoundedRating};

/// Render `value` with `digits` decimals.
///
/// Matches `{:.N}` except on values that sit exactly halfway between two
/// outputs: those round away from zero (`84.25` gives `84.3`), where `{:.N}`
/// would round to even. Values that only look like halves in decimal, such
/// as `0.15`, are not halves in binary and keep their nearest rendering.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value == 0.0 {
        // no "-0.0"
        return format!("{:.digits$}", 0.0);
    }
    if !is_decimal_tie(value, digits) {
        return format!("{value:.digits$}");
    }

    let Some(scale) = u32::try_from(digits).ok().and_then(|d| 10u64.checked_pow(d)) else {
        return format!("{value:.digits$}");
    };
    // An exact half times the scale is representable, so this product is exact
    let units = (value.abs() * scale as f64).ceil() as u64;
    let sign = if value < 0.0 { "-" } else { "" };

    if digits == 0 {
        format!("{sign}{units}")
    } else {
        format!("{sign}{}.{:0digits$}", units / scale, units % scale)
    }
}

/// True when `value * 10^digits` is exactly an integer plus one half.
fn is_decimal_tie(value: f64, digits: usize) -> bool {
    if !value.is_finite() || value == 0.0 {
        return false;
    }

    let bits = value.abs().to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    // value * 2 * 10^digits == mantissa * 5^digits * 2^(exponent + 1 + digits),
    // which is an odd integer only when the powers of two cancel exactly
    let Ok(digits) = u32::try_from(digits) else {
        return false;
    };
    let Some(scaled) = 5u128
        .checked_pow(digits)
        .and_then(|five| u128::from(mantissa).checked_mul(five))
    else {
        return false;
    };
    exponent + 1 + digits as i32 + scaled.trailing_zeros() as i32 == 0
}

/// One explained stage of a calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceStep {
    /// No conditions were supplied
    NothingToCalculate,
    Started { count: usize },
    PairFound { key: String },
    UnpairedLimb { name: String, laterality: Laterality },
    CombiningPairs { ratings: Vec<u8> },
    BilateralCombined { value: f64 },
    BilateralFactor { value: f64 },
    NoBilateralPairs,
    NoRatingsToCombine,
    FinalRatings { ratings: Vec<f64> },
    CombinedBodyRating { value: f64 },
    Rounded { combined: f64, rounded: RoundedRating },
    Compensation { rating: RoundedRating, amount: f64 },
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStep::NothingToCalculate => write!(f, "Add a disability rating to begin."),
            TraceStep::Started { count } => {
                write!(f, "Starting calculation with {} ratings.", count)
            }
            TraceStep::PairFound { key } => {
                write!(f, "Found bilateral pair for: {}.", capitalize(key))
            }
            TraceStep::UnpairedLimb { name, laterality } => write!(
                f,
                "Treating {} ({}) as a non-bilateral rating as it has no pair.",
                name,
                laterality.label()
            ),
            TraceStep::CombiningPairs { ratings } => {
                let joined = ratings
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join("%, ");
                write!(
                    f,
                    "Combining bilateral pair ratings ({}%) for bilateral factor.",
                    joined
                )
            }
            TraceStep::BilateralCombined { value } => {
                write!(f, "Combined bilateral rating = {}%", to_fixed(*value, 1))
            }
            TraceStep::BilateralFactor { value } => {
                write!(
                    f,
                    "Bilateral factor (10% of combined) = {}%",
                    to_fixed(*value, 1)
                )
            }
            TraceStep::NoBilateralPairs => {
                write!(f, "No bilateral pairs found. No bilateral factor to apply.")
            }
            TraceStep::NoRatingsToCombine => {
                write!(f, "No ratings available for final combination.")
            }
            TraceStep::FinalRatings { ratings } => {
                let joined = ratings
                    .iter()
                    .map(|r| to_fixed(*r, 1))
                    .collect::<Vec<_>>()
                    .join("%, ");
                write!(f, "Final ratings to combine (sorted): {}%", joined)
            }
            TraceStep::CombinedBodyRating { value } => {
                write!(f, "Combined Body Rating = {}%", to_fixed(*value, 1))
            }
            TraceStep::Rounded { combined, rounded } => write!(
                f,
                "Rounding {}% to the nearest 10% = {}%",
                to_fixed(*combined, 1),
                rounded.value()
            ),
            TraceStep::Compensation { rating, amount } => write!(
                f,
                "Monthly compensation for {}% rating: ${}",
                rating.value(),
                to_fixed(*amount, 2)
            ),
        }
    }
}

/// Ordered, append-only list of rendered trace lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationTrace {
    steps: Vec<String>,
}

impl CalculationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render and append a step.
    pub fn record(&mut self, step: TraceStep) {
        tracing::trace!(step = %step, "calculation step");
        self.steps.push(step.to_string());
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.steps
    }

    pub fn into_lines(self) -> Vec<String> {
        self.steps
    }
}
