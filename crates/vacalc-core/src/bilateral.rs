//! Bilateral pair detection.
//!
//! Lateral conditions are grouped by [`pair_key`]. A group holding at least
//! one LEFT and one RIGHT entry is a genuine pair and all of its ratings feed
//! the bilateral factor; any other group is just a set of ordinary ratings.

use std::collections::HashMap;

use crate::normalize::pair_key;
use crate::trace::{CalculationTrace, TraceStep};
use crate::types::{Laterality, RatedCondition};

/// Ratings split by how they enter the final combination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingPartition {
    /// Ratings combined directly into the whole-person rating
    pub non_bilateral: Vec<u8>,

    /// Ratings belonging to a left/right pair
    pub bilateral_pairs: Vec<u8>,
}

impl RatingPartition {
    pub fn has_pairs(&self) -> bool {
        !self.bilateral_pairs.is_empty()
    }
}

/// Lateral conditions sharing one pair key.
#[derive(Debug)]
struct PairGroup<'a> {
    key: String,
    members: Vec<&'a RatedCondition>,
}

impl PairGroup<'_> {
    fn has_side(&self, side: Laterality) -> bool {
        self.members.iter().any(|c| c.laterality == side)
    }

    fn is_pair(&self) -> bool {
        self.has_side(Laterality::Left) && self.has_side(Laterality::Right)
    }
}

/// Group lateral conditions by pair key, in order of first appearance.
fn group_lateral(conditions: &[RatedCondition]) -> Vec<PairGroup<'_>> {
    let mut groups: Vec<PairGroup<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for condition in conditions.iter().filter(|c| c.laterality.is_lateral()) {
        let key = pair_key(&condition.name);
        match index.get(&key) {
            Some(&slot) => groups[slot].members.push(condition),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(PairGroup {
                    key,
                    members: vec![condition],
                });
            }
        }
    }

    groups
}

/// Split conditions into non-bilateral and bilateral-pair ratings.
///
/// Records one trace line per pair found and one per unpaired limb.
pub fn partition(conditions: &[RatedCondition], trace: &mut CalculationTrace) -> RatingPartition {
    let mut partition = RatingPartition {
        non_bilateral: conditions
            .iter()
            .filter(|c| !c.laterality.is_lateral())
            .map(|c| c.rating)
            .collect(),
        bilateral_pairs: Vec::new(),
    };

    for group in group_lateral(conditions) {
        if group.is_pair() {
            tracing::debug!(key = %group.key, members = group.members.len(), "bilateral pair found");
            trace.record(TraceStep::PairFound {
                key: group.key.clone(),
            });
            partition
                .bilateral_pairs
                .extend(group.members.iter().map(|c| c.rating));
        } else {
            for condition in &group.members {
                tracing::warn!(
                    name = %condition.name,
                    side = %condition.laterality,
                    "unpaired limb treated as a regular rating"
                );
                trace.record(TraceStep::UnpairedLimb {
                    name: condition.name.clone(),
                    laterality: condition.laterality,
                });
                partition.non_bilateral.push(condition.rating);
            }
        }
    }

    partition
}
