//! The whole-person combination rule.
//!
//! Ratings are never added. Each rating is applied to the capacity left over
//! after the ratings before it:
//!
//! ```text
//! combine(acc, next) = acc + next * (1 - acc / 100)
//! ```
//!
//! Ratings are folded largest first, starting from zero.

use std::fmt;

use crate::trace::to_fixed;

/// Apply `next` to the capacity remaining after `acc`.
pub fn combine(acc: f64, next: f64) -> f64 {
    acc + next * (1.0 - acc / 100.0)
}

/// Sort ratings largest first.
pub fn sort_descending(ratings: &mut [f64]) {
    ratings.sort_by(|a, b| b.total_cmp(a));
}

/// One application of [`combine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombineStep {
    pub before: f64,
    pub applied: f64,
    pub after: f64,
}

impl fmt::Display for CombineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% of the remaining {}% added to {}% = {}%",
            to_fixed(self.applied, 1),
            to_fixed(100.0 - self.before, 1),
            to_fixed(self.before, 1),
            to_fixed(self.after, 1)
        )
    }
}

/// The intermediate values of a fold, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinationFold {
    pub steps: Vec<CombineStep>,
    pub total: f64,
}

/// Fold ratings in the order given, starting from 0.
///
/// Callers wanting the conventional result sort with [`sort_descending`]
/// first; the final value is the same either way, the steps are not.
pub fn fold(ratings: &[f64]) -> CombinationFold {
    let mut acc = 0.0;
    let steps = ratings
        .iter()
        .map(|&applied| {
            let before = acc;
            acc = combine(acc, applied);
            CombineStep {
                before,
                applied,
                after: acc,
            }
        })
        .collect();

    CombinationFold { steps, total: acc }
}

/// Combine ratings largest first.
pub fn combine_all(ratings: &[f64]) -> f64 {
    let mut sorted = ratings.to_vec();
    sort_descending(&mut sorted);
    fold(&sorted).total
}
