//! Breadth-first search that takes at most one dish per store.
//!
//! States are expanded in FIFO order. Each state may branch into "take the
//! current dish" (if it fits and its store is not yet represented) and always
//! branches into "skip it". Expansion stops once enough complete
//! combinations were collected.

use std::collections::VecDeque;

use rust_decimal::Decimal;

use super::{
    cheapest_completion, is_degenerate, prefix_sums, rank, store_ids, Combination,
    CombinationSearch, RankOrder, Strategy,
};
use crate::flatten::FlatDish;

/// Completed combinations collected per requested result before stopping.
pub const OPTIMIZED_RESULT_FACTOR: usize = 10;

/// Expanded states after which the search stops and returns what it has.
pub const OPTIMIZED_STATE_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct OptimizedSearch {
    state_limit: usize,
}

impl Default for OptimizedSearch {
    fn default() -> Self {
        Self {
            state_limit: OPTIMIZED_STATE_LIMIT,
        }
    }
}

impl OptimizedSearch {
    #[must_use]
    pub fn with_state_limit(state_limit: usize) -> Self {
        Self { state_limit }
    }
}

struct PartialState {
    index: usize,
    remaining_budget: Decimal,
    remaining_plates: usize,
    partial: Vec<usize>,
    visited_stores: Vec<usize>,
}

impl CombinationSearch for OptimizedSearch {
    fn strategy(&self) -> Strategy {
        Strategy::Optimized
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

        let n = dishes.len();
        let sums = prefix_sums(dishes);
        let stores = store_ids(dishes);
        let cap = max_results.saturating_mul(OPTIMIZED_RESULT_FACTOR);

        let mut completed: Vec<Vec<usize>> = Vec::new();
        let mut expanded = 0usize;
        let mut queue = VecDeque::from([PartialState {
            index: 0,
            remaining_budget: budget,
            remaining_plates: num_plates,
            partial: Vec::with_capacity(num_plates),
            visited_stores: Vec::with_capacity(num_plates),
        }]);

        while completed.len() < cap {
            let Some(state) = queue.pop_front() else {
                break;
            };

            if state.remaining_plates == 0 {
                completed.push(state.partial);
                continue;
            }
            if state.index >= n || state.remaining_budget <= Decimal::ZERO {
                continue;
            }
            // Ignoring the store rule, the cheapest completion is a lower bound.
            let reachable = cheapest_completion(&sums, state.index, state.remaining_plates)
                .is_some_and(|cheapest| cheapest <= state.remaining_budget);
            if !reachable {
                continue;
            }

            expanded += 1;
            if expanded > self.state_limit {
                tracing::debug!(expanded, "optimized search hit its state limit");
                break;
            }

            let current = &dishes[state.index];
            let store = stores[state.index];
            if current.price <= state.remaining_budget && !state.visited_stores.contains(&store) {
                let mut partial = state.partial.clone();
                partial.push(state.index);
                let mut visited_stores = state.visited_stores.clone();
                visited_stores.push(store);
                queue.push_back(PartialState {
                    index: state.index + 1,
                    remaining_budget: state.remaining_budget - current.price,
                    remaining_plates: state.remaining_plates - 1,
                    partial,
                    visited_stores,
                });
            }

            queue.push_back(PartialState {
                index: state.index + 1,
                ..state
            });
        }

        tracing::debug!(
            dishes = n,
            expanded,
            completed = completed.len(),
            "optimized search finished"
        );

        let combinations = completed
            .into_iter()
            .map(|picked| Combination::new(picked.into_iter().map(|i| dishes[i]).collect()))
            .collect();

        rank(
            combinations,
            budget,
            RankOrder::StoreDiversityFirst,
            max_results,
        )
    }
}
