//! Caching layer for vacalc-runtime.
//!
//! Provides in-memory caching of calculation results so repeated claims
//! (batch runs, status comparisons) skip recomputation.

use moka::sync::Cache;
use std::time::Duration;
use vacalc_core::{CacheSettings, CalculationResult, DependencyStatus, Laterality, RatedCondition};

/// The parts of a condition that affect a result. Ids are left out.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ConditionSnapshot {
    name: String,
    rating: u8,
    laterality: Laterality,
}

/// Cache key: an owned snapshot of the condition list plus the status.
///
/// Two keys are equal when the conditions match in order, so a later edit to
/// the caller's list can never alias an earlier entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    conditions: Vec<ConditionSnapshot>,
    status: DependencyStatus,
}

impl CacheKey {
    /// Create a cache key from calculation inputs.
    pub fn new(conditions: &[RatedCondition], status: DependencyStatus) -> Self {
        Self {
            conditions: conditions
                .iter()
                .map(|c| ConditionSnapshot {
                    name: c.name.clone(),
                    rating: c.rating,
                    laterality: c.laterality,
                })
                .collect(),
            status,
        }
    }

    pub fn status(&self) -> DependencyStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Calculation cache using moka.
pub struct CalculationCache {
    cache: Cache<CacheKey, CalculationResult>,
}

impl CalculationCache {
    /// Create a new cache with the given bounds.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_entries, Duration::from_secs(settings.ttl_secs))
    }

    /// Get a cached result.
    pub fn get(&self, key: &CacheKey) -> Option<CalculationResult> {
        self.cache.get(key)
    }

    /// Store a result in the cache.
    pub fn insert(&self, key: CacheKey, result: CalculationResult) {
        self.cache.insert(key, result);
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for CalculationCache {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knees() -> Vec<RatedCondition> {
        vec![
            RatedCondition::new("c1", "Knee", 20, Laterality::Left),
            RatedCondition::new("c2", "Knee", 10, Laterality::Right),
        ]
    }

    #[test]
    fn test_key_ignores_ids() {
        let mut renamed = knees();
        renamed[0].id = "c9".to_string();

        assert_eq!(
            CacheKey::new(&knees(), DependencyStatus::VeteranOnly),
            CacheKey::new(&renamed, DependencyStatus::VeteranOnly)
        );
    }

    #[test]
    fn test_key_distinguishes_status_and_content() {
        let base = CacheKey::new(&knees(), DependencyStatus::VeteranOnly);
        assert_ne!(base, CacheKey::new(&knees(), DependencyStatus::VeteranWithSpouse));

        let mut changed = knees();
        changed[1].rating = 20;
        assert_ne!(base, CacheKey::new(&changed, DependencyStatus::VeteranOnly));

        let mut swapped = knees();
        swapped.reverse();
        assert_ne!(base, CacheKey::new(&swapped, DependencyStatus::VeteranOnly));
    }

    #[test]
    fn test_cache_operations() {
        let cache = CalculationCache::default();
        let key = CacheKey::new(&knees(), DependencyStatus::VeteranOnly);

        // Cache miss
        assert!(cache.get(&key).is_none());

        let result = CalculationResult::zero(vec!["cached".to_string()]);
        cache.insert(key.clone(), result.clone());

        // Cache hit
        assert_eq!(cache.get(&key), Some(result));
        assert_eq!(cache.entry_count(), 1);

        cache.invalidate_all();
        assert!(cache.get(&key).is_none());
    }
}
