//! # vacalc-runtime
//!
//! Memoizing runtime for vacalc.
//!
//! ## Important
//!
//! This crate is OPTIONAL. The calculator in `vacalc-core` is a pure function
//! and is cheap enough to rerun on every change. Use this crate when the same
//! claims are evaluated repeatedly, e.g. batch runs over many claim files.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vacalc_runtime::MemoizedCalculator;
//!
//! let calculator = MemoizedCalculator::from_config(&config)?;
//! let result = calculator.calculate(claim.conditions(), claim.status());
//! println!("{} hits, {} misses", calculator.stats().hits, calculator.stats().misses);
//! ```

pub mod cache;

pub use cache::{CacheKey, CalculationCache};

use std::sync::atomic::{AtomicU64, Ordering};
use vacalc_core::{
    CalculationResult, Calculator, ConfigError, DependencyStatus, RatedCondition, VacalcConfig,
};

/// Hit and miss counts since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// A core calculator fronted by a result cache.
pub struct MemoizedCalculator {
    calculator: Calculator,
    cache: CalculationCache,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoizedCalculator {
    pub fn new(calculator: Calculator, cache: CalculationCache) -> Self {
        Self {
            calculator,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Build from configuration: configured rates and cache bounds.
    pub fn from_config(config: &VacalcConfig) -> Result<Self, ConfigError> {
        let calculator = Calculator::new(config.load_rates()?);
        Ok(Self::new(
            calculator,
            CalculationCache::from_settings(&config.cache),
        ))
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Calculate, reusing a cached result for structurally identical input.
    pub fn calculate(
        &self,
        conditions: &[RatedCondition],
        status: DependencyStatus,
    ) -> CalculationResult {
        let key = CacheKey::new(conditions, status);

        if let Some(result) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(conditions = key.len(), status = %status, "cache hit");
            return result;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = self.calculator.calculate(conditions, status);
        self.cache.insert(key, result.clone());
        result
    }

    /// Memoized counterpart of `Calculator::compare_statuses`.
    pub fn compare_statuses(
        &self,
        conditions: &[RatedCondition],
    ) -> Vec<(DependencyStatus, CalculationResult)> {
        DependencyStatus::ALL
            .into_iter()
            .map(|status| (status, self.calculate(conditions, status)))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop cached results and reset the counters.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
