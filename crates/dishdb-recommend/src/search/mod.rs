//! Combination search over a price-sorted list of [`FlatDish`] entries.
//!
//! Three interchangeable strategies share one contract: every returned
//! [`Combination`] holds exactly `num_plates` entries whose prices sum to at
//! most `budget`. Degenerate input (no plates, no budget, no results wanted)
//! yields an empty list, never an error.

mod exact;
mod greedy;
mod optimized;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::RequestError;
use crate::flatten::FlatDish;

pub use exact::{ExactSearch, EXACT_NODE_LIMIT};
pub use greedy::{GreedySearch, GREEDY_PICK_ATTEMPTS, GREEDY_TRIAL_FACTOR};
pub use optimized::{OptimizedSearch, OPTIMIZED_RESULT_FACTOR, OPTIMIZED_STATE_LIMIT};

/// A selection of dishes, possibly from several stores.
#[derive(Debug, Clone)]
pub struct Combination<'a> {
    pub entries: Vec<FlatDish<'a>>,
}

impl<'a> Combination<'a> {
    #[must_use]
    pub fn new(entries: Vec<FlatDish<'a>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(|e| e.price).sum()
    }

    #[must_use]
    pub fn residual(&self, budget: Decimal) -> Decimal {
        budget - self.total()
    }

    /// Number of different stores represented, names compared case-insensitively.
    #[must_use]
    pub fn distinct_stores(&self) -> usize {
        let mut seen: Vec<String> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let key = entry.store_key();
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen.len()
    }
}

/// A search strategy. Input must be sorted ascending by price.
pub trait CombinationSearch {
    fn strategy(&self) -> Strategy;

    fn search<'a>(
        &mut self,
        dishes: &[FlatDish<'a>],
        budget: Decimal,
        num_plates: usize,
        max_results: usize,
    ) -> Vec<Combination<'a>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Exhaustive include/exclude enumeration.
    Exact,
    /// Breadth-first, one dish per store.
    #[default]
    Optimized,
    /// Randomized construction; fast, no coverage guarantee.
    Greedy,
}

impl Strategy {
    /// Lenient parse for request boundaries: unknown names fall back to
    /// [`Strategy::Optimized`].
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(algorithm = %raw, "unknown algorithm; using optimized");
            Strategy::Optimized
        })
    }

    /// Builds the searcher for this strategy. `seed` only affects
    /// [`Strategy::Greedy`]; without one the generator is seeded from the OS.
    #[must_use]
    pub fn searcher(self, seed: Option<u64>) -> Box<dyn CombinationSearch> {
        match self {
            Strategy::Exact => Box::new(ExactSearch::default()),
            Strategy::Optimized => Box::new(OptimizedSearch::default()),
            Strategy::Greedy => match seed {
                Some(seed) => Box::new(GreedySearch::seeded(seed)),
                None => Box::new(GreedySearch::from_os_rng()),
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Exact => write!(f, "exact"),
            Strategy::Optimized => write!(f, "optimized"),
            Strategy::Greedy => write!(f, "greedy"),
        }
    }
}

impl FromStr for Strategy {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(Strategy::Exact),
            "optimized" => Ok(Strategy::Optimized),
            "greedy" => Ok(Strategy::Greedy),
            _ => Err(RequestError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Final ordering applied by each strategy before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RankOrder {
    /// Lowest residual, then highest total.
    ClosestToBudget,
    /// Most distinct stores, then lowest residual, then highest total.
    StoreDiversityFirst,
    /// Lowest residual, then most distinct stores.
    ClosestThenDiverse,
}

impl RankOrder {
    fn compare(self, a: &Combination<'_>, b: &Combination<'_>, budget: Decimal) -> Ordering {
        let by_residual = a.residual(budget).cmp(&b.residual(budget));
        let by_total_desc = b.total().cmp(&a.total());
        let by_stores_desc = b.distinct_stores().cmp(&a.distinct_stores());
        match self {
            RankOrder::ClosestToBudget => by_residual.then(by_total_desc),
            RankOrder::StoreDiversityFirst => by_stores_desc.then(by_residual).then(by_total_desc),
            RankOrder::ClosestThenDiverse => by_residual.then(by_stores_desc),
        }
    }
}

/// Drops zero-total combinations, sorts, and keeps the best `max_results`.
pub(crate) fn rank<'a>(
    mut combinations: Vec<Combination<'a>>,
    budget: Decimal,
    order: RankOrder,
    max_results: usize,
) -> Vec<Combination<'a>> {
    combinations.retain(|c| c.total() > Decimal::ZERO);
    combinations.sort_by(|a, b| order.compare(a, b, budget));
    combinations.truncate(max_results);
    combinations
}

/// `true` when the search should not run at all.
pub(crate) fn is_degenerate(budget: Decimal, num_plates: usize, max_results: usize) -> bool {
    budget <= Decimal::ZERO || num_plates == 0 || max_results == 0
}

/// `sums[i]` is the total price of `dishes[..i]`.
pub(crate) fn prefix_sums(dishes: &[FlatDish<'_>]) -> Vec<Decimal> {
    let mut sums = Vec::with_capacity(dishes.len() + 1);
    let mut running = Decimal::ZERO;
    sums.push(running);
    for dish in dishes {
        running += dish.price;
        sums.push(running);
    }
    sums
}

/// Cheapest possible total for `count` more dishes taken from `index..`,
/// or `None` if fewer than `count` dishes remain. Relies on ascending order.
pub(crate) fn cheapest_completion(sums: &[Decimal], index: usize, count: usize) -> Option<Decimal> {
    let end = index.checked_add(count)?;
    (end < sums.len()).then(|| sums[end] - sums[index])
}

/// Most expensive possible total for `count` more dishes taken from `index..`.
pub(crate) fn priciest_completion(sums: &[Decimal], index: usize, count: usize) -> Option<Decimal> {
    let n = sums.len().checked_sub(1)?;
    let start = n.checked_sub(count)?;
    (start >= index).then(|| sums[n] - sums[start])
}

/// Dense per-entry store ids, names compared case-insensitively.
pub(crate) fn store_ids(dishes: &[FlatDish<'_>]) -> Vec<usize> {
    let mut ids: HashMap<String, usize> = HashMap::new();
    dishes
        .iter()
        .map(|d| {
            let next = ids.len();
            *ids.entry(d.store_key()).or_insert(next)
        })
        .collect()
}


#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
