//! Randomized construction: repeatedly draw a store, then a dish from it.
//!
//! Cheap and bounded, but with no coverage guarantee. Results depend on the
//! injected generator; a seeded one makes runs reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::{is_degenerate, rank, Combination, CombinationSearch, RankOrder, Strategy};
use crate::flatten::{group_by_store, FlatDish};

/// Trials attempted per requested result.
pub const GREEDY_TRIAL_FACTOR: usize = 5;

/// Random picks per trial before giving up on it.
pub const GREEDY_PICK_ATTEMPTS: usize = 100;

#[derive(Debug, Clone)]
pub struct GreedySearch<R> {
    rng: R,
}

impl GreedySearch<StdRng> {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> GreedySearch<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One trial. Returns the picks only if exactly `num_plates` were accepted.
    fn trial<'a>(
        &mut self,
        groups: &[Vec<FlatDish<'a>>],
        budget: Decimal,
        num_plates: usize,
    ) -> Option<Vec<FlatDish<'a>>> {
        let mut picked: Vec<FlatDish<'a>> = Vec::with_capacity(num_plates);
        let mut used = vec![false; groups.len()];
        let mut used_count = 0usize;
        let mut total = Decimal::ZERO;

        for _ in 0..GREEDY_PICK_ATTEMPTS {
            if picked.len() == num_plates {
                break;
            }
            let store = self.rng.random_range(0..groups.len());
            if used[store] && used_count < groups.len() {
                continue;
            }
            let group = &groups[store];
            let candidate = group[self.rng.random_range(0..group.len())];
            if total + candidate.price <= budget {
                total += candidate.price;
                picked.push(candidate);
                if !used[store] {
                    used[store] = true;
                    used_count += 1;
                }
            }
        }

        (picked.len() == num_plates).then_some(picked)
    }
}

impl<R: Rng> CombinationSearch for GreedySearch<R> {
    fn strategy(&self) -> Strategy {
        Strategy::Greedy
    }

    fn search<'a>(
        &mut self,
        dishes: &[FlatDish<'a>],
        budget: Decimal,
        num_plates: usize,
        max_results: usize,
    ) -> Vec<Combination<'a>> {
        if is_degenerate(budget, num_plates, max_results) {
            return Vec::new();
        }

        let groups = group_by_store(dishes);
        if groups.is_empty() {
            return Vec::new();
        }

        let trials = max_results.saturating_mul(GREEDY_TRIAL_FACTOR);
        let mut found: Vec<Combination<'a>> = Vec::new();
        let mut attempted = 0usize;
        while attempted < trials && found.len() < max_results {
            attempted += 1;
            if let Some(picked) = self.trial(&groups, budget, num_plates) {
                found.push(Combination::new(picked));
            }
        }

        tracing::debug!(
            stores = groups.len(),
            attempted,
            found = found.len(),
            "greedy search finished"
        );

        rank(found, budget, RankOrder::ClosestThenDiverse, max_results)
    }
}
