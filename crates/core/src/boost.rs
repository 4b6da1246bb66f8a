//! Pluggable relevance boost applied when a search carries a free-text description.
//!
//! Provides a `RelevanceBooster` trait with three implementations: `RandomBooster`
//! (uniform integer in `[0, 10)`, a stand-in for a real semantic-similarity signal),
//! `NoBoost` (always zero) and `FixedBooster` (constant, for deterministic tests).
//! The pipeline caps the boosted score at 100 regardless of the booster.

use rand::Rng;
use std::sync::Arc;
use tracing::warn;

use crate::types::Dataset;

/// Exclusive upper bound of the random boost.
pub const RANDOM_BOOST_CEILING: u8 = 10;

pub trait RelevanceBooster: Send + Sync {
    /// Additive score bump for `dataset` given the searcher's description.
    fn boost(&self, dataset: &Dataset, description: &str) -> u8;
    fn name(&self) -> &str;
}

/// Default: uniform random bump, not proportional to any real similarity.
pub struct RandomBooster;

impl RelevanceBooster for RandomBooster {
    fn boost(&self, _dataset: &Dataset, _description: &str) -> u8 {
        rand::thread_rng().gen_range(0..RANDOM_BOOST_CEILING)
    }
    fn name(&self) -> &str {
        "random"
    }
}

pub struct NoBoost;

impl RelevanceBooster for NoBoost {
    fn boost(&self, _dataset: &Dataset, _description: &str) -> u8 {
        0
    }
    fn name(&self) -> &str {
        "none"
    }
}

pub struct FixedBooster(pub u8);

impl RelevanceBooster for FixedBooster {
    fn boost(&self, _dataset: &Dataset, _description: &str) -> u8 {
        self.0
    }
    fn name(&self) -> &str {
        "fixed"
    }
}

/// Create a booster by name. Falls back to random for unknown names.
pub fn create_booster(name: &str) -> Arc<dyn RelevanceBooster> {
    match name {
        "none" | "off" => Arc::new(NoBoost),
        "random" => Arc::new(RandomBooster),
        other => {
            warn!(booster = other, "Unknown booster, using random");
            Arc::new(RandomBooster)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn random_boost_stays_below_ceiling() {
        let catalog = Catalog::builtin().unwrap();
        let d = &catalog.all_datasets()[0];
        for _ in 0..500 {
            assert!(RandomBooster.boost(d, "anything") < RANDOM_BOOST_CEILING);
        }
    }

    #[test]
    fn create_booster_by_name() {
        assert_eq!(create_booster("none").name(), "none");
        assert_eq!(create_booster("random").name(), "random");
        assert_eq!(create_booster("semantic-v2").name(), "random");
    }
}
