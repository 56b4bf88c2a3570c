//! Exhaustive include/exclude enumeration with memoized dead states.
//!
//! The walk runs on an explicit stack so depth is bounded by the heap, not
//! the call stack. A subproblem is identified by
//! `(index, remaining_budget, remaining_plates, chosen_so_far)`; because the
//! amount already spent is `budget - remaining_budget`, every prefix reaching
//! the same key sees exactly the same set of completion totals. Only keys
//! whose subtree produced no improvement of the retained top results are
//! memoized, so a cached entry never stands in for a real combination.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::{
    cheapest_completion, is_degenerate, prefix_sums, priciest_completion, rank, Combination,
    CombinationSearch, RankOrder, Strategy,
};
use crate::flatten::FlatDish;

/// Expanded states after which the enumeration stops and returns what it has.
pub const EXACT_NODE_LIMIT: usize = 2_000_000;

type MemoKey = (usize, Decimal, usize, usize);

#[derive(Debug, Clone)]
pub struct ExactSearch {
    node_limit: usize,
}

impl Default for ExactSearch {
    fn default() -> Self {
        Self {
            node_limit: EXACT_NODE_LIMIT,
        }
    }
}

impl ExactSearch {
    #[must_use]
    pub fn with_node_limit(node_limit: usize) -> Self {
        Self { node_limit }
    }
}

enum Step {
    Visit {
        index: usize,
        remaining_budget: Decimal,
        remaining_plates: usize,
    },
    Include {
        dish: usize,
        remaining_budget: Decimal,
        remaining_plates: usize,
    },
    Unchoose,
    Leave {
        key: MemoKey,
        improvements_before: usize,
    },
}

/// The `capacity` highest-total selections seen so far.
struct TopResults {
    capacity: usize,
    entries: Vec<(Decimal, Vec<usize>)>,
    floor: Option<Decimal>,
    improvements: usize,
}

impl TopResults {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
            floor: None,
            improvements: 0,
        }
    }

    /// Lowest retained total once full; anything at or below it cannot enter.
    fn floor(&self) -> Option<Decimal> {
        self.floor
    }

    fn offer(&mut self, total: Decimal, chosen: &[usize]) {
        if self.entries.len() < self.capacity {
            self.entries.push((total, chosen.to_vec()));
        } else {
            let Some((weakest, weakest_total)) = self
                .entries
                .iter()
                .enumerate()
                .min_by(|a, b| a.1 .0.cmp(&b.1 .0))
                .map(|(i, (t, _))| (i, *t))
            else {
                return;
            };
            if total <= weakest_total {
                return;
            }
            self.entries[weakest] = (total, chosen.to_vec());
        }
        self.improvements += 1;
        if self.entries.len() == self.capacity {
            self.floor = self.entries.iter().map(|(t, _)| *t).min();
        }
    }
}

impl CombinationSearch for ExactSearch {
    fn strategy(&self) -> Strategy {
        Strategy::Exact
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
        let mut best = TopResults::new(max_results);
        let mut dead: HashSet<MemoKey> = HashSet::new();
        let mut chosen: Vec<usize> = Vec::with_capacity(num_plates);
        let mut expanded = 0usize;
        let mut truncated = false;

        let mut stack = vec![Step::Visit {
            index: 0,
            remaining_budget: budget,
            remaining_plates: num_plates,
        }];

        while let Some(step) = stack.pop() {
            let (index, remaining_budget, remaining_plates) = match step {
                Step::Unchoose => {
                    chosen.pop();
                    continue;
                }
                Step::Leave {
                    key,
                    improvements_before,
                } => {
                    if best.improvements == improvements_before {
                        dead.insert(key);
                    }
                    continue;
                }
                Step::Include {
                    dish,
                    remaining_budget,
                    remaining_plates,
                } => {
                    chosen.push(dish);
                    (dish + 1, remaining_budget, remaining_plates)
                }
                Step::Visit {
                    index,
                    remaining_budget,
                    remaining_plates,
                } => (index, remaining_budget, remaining_plates),
            };

            if remaining_plates == 0 {
                best.offer(budget - remaining_budget, &chosen);
                continue;
            }
            if index >= n || remaining_budget <= Decimal::ZERO {
                continue;
            }

            let key = (index, remaining_budget, remaining_plates, chosen.len());
            if dead.contains(&key) {
                continue;
            }

            let fits = cheapest_completion(&sums, index, remaining_plates)
                .is_some_and(|cheapest| cheapest <= remaining_budget);
            if !fits {
                dead.insert(key);
                continue;
            }

            if let Some(floor) = best.floor() {
                let spent = budget - remaining_budget;
                let ceiling = priciest_completion(&sums, index, remaining_plates)
                    .map_or(Decimal::ZERO, |priciest| spent + priciest.min(remaining_budget));
                if ceiling <= floor {
                    dead.insert(key);
                    continue;
                }
            }

            expanded += 1;
            if expanded > self.node_limit {
                truncated = true;
                break;
            }

            stack.push(Step::Leave {
                key,
                improvements_before: best.improvements,
            });
            stack.push(Step::Visit {
                index: index + 1,
                remaining_budget,
                remaining_plates,
            });
            let price = dishes[index].price;
            if price <= remaining_budget {
                stack.push(Step::Unchoose);
                stack.push(Step::Include {
                    dish: index,
                    remaining_budget: remaining_budget - price,
                    remaining_plates: remaining_plates - 1,
                });
            }
        }

        tracing::debug!(
            dishes = n,
            expanded,
            memoized = dead.len(),
            kept = best.entries.len(),
            truncated,
            "exact search finished"
        );

        let combinations = best
            .entries
            .into_iter()
            .map(|(_, picked)| Combination::new(picked.into_iter().map(|i| dishes[i]).collect()))
            .collect();

        rank(combinations, budget, RankOrder::ClosestToBudget, max_results)
    }
}
