//! Core data contracts shared by the calculator, the claim roster and the
//! compensation table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the body a rated condition affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Laterality {
    /// Not tied to a side (or the side is irrelevant)
    #[default]
    None,
    Left,
    Right,
}

impl Laterality {
    /// True for LEFT and RIGHT, the only sides that can form a bilateral pair.
    pub fn is_lateral(self) -> bool {
        matches!(self, Laterality::Left | Laterality::Right)
    }

    /// Title-cased side name used in trace lines and reports.
    pub fn label(self) -> &'static str {
        match self {
            Laterality::None => "None",
            Laterality::Left => "Left",
            Laterality::Right => "Right",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Laterality::None => "NONE",
            Laterality::Left => "LEFT",
            Laterality::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Laterality {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Ok(Laterality::None),
            "LEFT" | "L" => Ok(Laterality::Left),
            "RIGHT" | "R" => Ok(Laterality::Right),
            _ => Err(ParseEnumError {
                kind: "laterality",
                value: s.to_string(),
            }),
        }
    }
}

/// Household composition used to pick the compensation column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyStatus {
    #[default]
    VeteranOnly,
    VeteranWithSpouse,
    VeteranWithSpouseAndChild,
    VeteranWithChild,
    VeteranWithSpouseAndTwoChildren,
    VeteranWithTwoChildren,
}

impl DependencyStatus {
    /// Every status, in the order they are offered to users.
    pub const ALL: [DependencyStatus; 6] = [
        DependencyStatus::VeteranOnly,
        DependencyStatus::VeteranWithSpouse,
        DependencyStatus::VeteranWithChild,
        DependencyStatus::VeteranWithSpouseAndChild,
        DependencyStatus::VeteranWithTwoChildren,
        DependencyStatus::VeteranWithSpouseAndTwoChildren,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DependencyStatus::VeteranOnly => "Veteran Only",
            DependencyStatus::VeteranWithSpouse => "Veteran with Spouse",
            DependencyStatus::VeteranWithChild => "Veteran with 1 Child",
            DependencyStatus::VeteranWithSpouseAndChild => "Veteran with Spouse & 1 Child",
            DependencyStatus::VeteranWithTwoChildren => "Veteran with 2 Children",
            DependencyStatus::VeteranWithSpouseAndTwoChildren => {
                "Veteran with Spouse & 2 Children"
            }
        }
    }

    /// Wire name, as used in data files and claim files.
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyStatus::VeteranOnly => "VETERAN_ONLY",
            DependencyStatus::VeteranWithSpouse => "VETERAN_WITH_SPOUSE",
            DependencyStatus::VeteranWithSpouseAndChild => "VETERAN_WITH_SPOUSE_AND_CHILD",
            DependencyStatus::VeteranWithChild => "VETERAN_WITH_CHILD",
            DependencyStatus::VeteranWithSpouseAndTwoChildren => {
                "VETERAN_WITH_SPOUSE_AND_TWO_CHILDREN"
            }
            DependencyStatus::VeteranWithTwoChildren => "VETERAN_WITH_TWO_CHILDREN",
        }
    }
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyStatus {
    type Err = ParseEnumError;

    /// Accepts the wire name in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        DependencyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ParseEnumError {
                kind: "dependency status",
                value: s.to_string(),
            })
    }
}

/// Error returned when parsing an enumerated value from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// A single rated condition as supplied to the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatedCondition {
    /// Opaque identifier, unique within a claim
    pub id: String,

    /// Condition name as entered or picked from the catalog
    pub name: String,

    /// Percentage rating (0..=100, normally a multiple of 10)
    pub rating: u8,

    #[serde(default)]
    pub laterality: Laterality,
}

impl RatedCondition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rating: u8,
        laterality: Laterality,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            laterality,
        }
    }

    /// Name with the side appended, e.g. `Plantar Fasciitis (Left)`.
    pub fn display_name(&self) -> String {
        if self.laterality.is_lateral() {
            format!("{} ({})", self.name, self.laterality.label())
        } else {
            self.name.clone()
        }
    }
}

/// A whole-person rating rounded to one of the eleven buckets 0, 10, ..., 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoundedRating(u8);

impl RoundedRating {
    pub const ZERO: RoundedRating = RoundedRating(0);
    pub const MAX: RoundedRating = RoundedRating(100);

    /// Build a bucket from an exact multiple of ten no larger than 100.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 100 && value % 10 == 0).then_some(Self(value))
    }

    /// Round a combined rating to the nearest ten, halves rounding up.
    ///
    /// Values outside `[0, 100]` (and NaN) are clamped, so this never fails.
    pub fn nearest(combined: f64) -> Self {
        let tens = (combined / 10.0).round().clamp(0.0, 10.0);
        // NaN survives clamp and casts to 0
        Self(tens as u8 * 10)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// All eleven buckets in ascending order.
    pub fn all() -> impl Iterator<Item = RoundedRating> {
        (0..=10u8).map(|tens| RoundedRating(tens * 10))
    }
}

impl TryFrom<u8> for RoundedRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        RoundedRating::new(value)
            .ok_or_else(|| format!("rating {value} is not a multiple of 10 between 0 and 100"))
    }
}

impl From<RoundedRating> for u8 {
    fn from(rating: RoundedRating) -> Self {
        rating.0
    }
}

impl fmt::Display for RoundedRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// The outcome of one calculator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Extra percentage contributed by paired-limb conditions
    pub bilateral_factor: f64,

    /// Combined whole-person rating before rounding
    pub combined_body_rating: f64,

    /// Combined rating rounded to the nearest ten
    pub final_rounded_rating: RoundedRating,

    /// Monthly amount for the rounded rating and dependency status
    pub monthly_compensation: f64,

    /// Human-readable explanation, in the order the work was done
    pub calculation_steps: Vec<String>,
}

impl CalculationResult {
    /// An all-zero result carrying only an explanation.
    pub fn zero(calculation_steps: Vec<String>) -> Self {
        Self {
            bilateral_factor: 0.0,
            combined_body_rating: 0.0,
            final_rounded_rating: RoundedRating::ZERO,
            monthly_compensation: 0.0,
            calculation_steps,
        }
    }

    pub fn has_bilateral_factor(&self) -> bool {
        self.bilateral_factor > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rating_half_up() {
        assert_eq!(RoundedRating::nearest(47.0).value(), 50);
        assert_eq!(RoundedRating::nearest(44.9).value(), 40);
        assert_eq!(RoundedRating::nearest(45.0).value(), 50);
        assert_eq!(RoundedRating::nearest(4.9).value(), 0);
        assert_eq!(RoundedRating::nearest(5.0).value(), 10);
        assert_eq!(RoundedRating::nearest(99.9).value(), 100);
    }

    #[test]
    fn test_rounded_rating_clamps() {
        assert_eq!(RoundedRating::nearest(-3.0), RoundedRating::ZERO);
        assert_eq!(RoundedRating::nearest(180.0), RoundedRating::MAX);
        assert_eq!(RoundedRating::nearest(f64::NAN), RoundedRating::ZERO);
    }

    #[test]
    fn test_rounded_rating_rejects_off_bucket_values() {
        assert!(RoundedRating::new(35).is_none());
        assert!(RoundedRating::new(110).is_none());
        assert_eq!(RoundedRating::new(70).map(RoundedRating::value), Some(70));
        assert_eq!(RoundedRating::all().count(), 11);
    }

    #[test]
    fn test_dependency_status_parsing() {
        assert_eq!(
            "veteran-with-spouse".parse::<DependencyStatus>().unwrap(),
            DependencyStatus::VeteranWithSpouse
        );
        assert_eq!(
            "VETERAN_WITH_TWO_CHILDREN".parse::<DependencyStatus>().unwrap(),
            DependencyStatus::VeteranWithTwoChildren
        );
        assert!("grandparents".parse::<DependencyStatus>().is_err());
    }

    #[test]
    fn test_dependency_status_wire_names_round_trip_through_serde() {
        for status in DependencyStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_display_name_includes_side() {
        let left = RatedCondition::new("c1", "Plantar Fasciitis", 10, Laterality::Left);
        let none = RatedCondition::new("c2", "Tinnitus", 10, Laterality::None);
        assert_eq!(left.display_name(), "Plantar Fasciitis (Left)");
        assert_eq!(none.display_name(), "Tinnitus");
    }
}
