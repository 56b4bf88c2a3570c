//! Request-level entry point: validate, run one strategy, summarize.

use std::time::Instant;

use dishdb_core::Store;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{aggregate, Recommendation};
use crate::error::RequestError;
use crate::flatten::{count_dishes, flatten_catalog, sort_by_price};
use crate::price::{parse_price, serialize_formatted};
use crate::search::{CombinationSearch, Strategy};

pub const DEFAULT_MAX_RESULTS: usize = 10;

const NO_COMBINATIONS_MESSAGE: &str =
    "No valid combinations found for the given budget and number of plates";

const NO_COMBINATIONS_SUGGESTIONS: [&str; 3] = [
    "Try increasing your budget",
    "Try reducing the number of plates",
    "Some stores might not have dishes in your price range",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    /// Free text such as `"300 MAD"`; parsed like any catalog price.
    pub budget: String,
    pub num_plates: usize,
    pub strategy: Strategy,
    pub max_results: usize,
    /// Only used by [`Strategy::Greedy`].
    pub seed: Option<u64>,
}

impl RecommendationRequest {
    #[must_use]
    pub fn new(budget: impl Into<String>, num_plates: usize) -> Self {
        Self {
            budget: budget.into(),
            num_plates,
            strategy: Strategy::default(),
            max_results: DEFAULT_MAX_RESULTS,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub budget: String,
    #[serde(rename = "numPlates")]
    pub num_plates: usize,
    #[serde(rename = "algorithm")]
    pub strategy: Strategy,
    pub processing_time_ms: u64,
    #[serde(flatten)]
    pub outcome: RecommendationOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationOutcome {
    Found {
        #[serde(rename = "statistics")]
        summary: RecommendationSummary,
        recommendations: Vec<Recommendation>,
    },
    /// A successful search that found nothing. Not an error.
    NoCombinations {
        message: String,
        suggestions: Vec<String>,
    },
}

impl RecommendationOutcome {
    fn no_combinations() -> Self {
        RecommendationOutcome::NoCombinations {
            message: NO_COMBINATIONS_MESSAGE.to_string(),
            suggestions: NO_COMBINATIONS_SUGGESTIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    #[must_use]
    pub fn recommendations(&self) -> &[Recommendation] {
        match self {
            RecommendationOutcome::Found {
                recommendations, ..
            } => recommendations,
            RecommendationOutcome::NoCombinations { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub total_combinations_found: usize,
    /// Best combination's total divided by the plate count.
    #[serde(serialize_with = "serialize_formatted")]
    pub average_price_per_plate: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub min_residual: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub max_residual: Decimal,
    pub stores_count: usize,
    /// Every dish in the catalog, priced or not.
    pub total_dishes_considered: usize,
}

/// Checks a request the way the HTTP and CLI layers must before searching.
/// Returns the parsed budget.
///
/// # Errors
///
/// Returns a [`RequestError`] for an empty budget, a budget that parses to
/// zero, zero plates or zero results.
pub fn validate_request(req: &RecommendationRequest) -> Result<Decimal, RequestError> {
    if req.budget.trim().is_empty() {
        return Err(RequestError::MissingBudget);
    }
    if req.num_plates == 0 {
        return Err(RequestError::InvalidPlateCount);
    }
    if req.max_results == 0 {
        return Err(RequestError::InvalidMaxResults);
    }
    let budget = parse_price(&req.budget);
    if budget <= Decimal::ZERO {
        return Err(RequestError::InvalidBudget(req.budget.clone()));
    }
    Ok(budget)
}

/// Flatten, sort, search and aggregate. Combinations the aggregator rejects
/// are dropped.
pub fn find_combinations(
    stores: &[Store],
    budget: Decimal,
    num_plates: usize,
    max_results: usize,
    searcher: &mut dyn CombinationSearch,
) -> Vec<Recommendation> {
    let mut flat = flatten_catalog(stores, budget);
    sort_by_price(&mut flat);

    searcher
        .search(&flat, budget, num_plates, max_results)
        .iter()
        .filter_map(|combination| aggregate(combination, budget))
        .collect()
}

fn summarize(
    stores: &[Store],
    num_plates: usize,
    recommendations: &[Recommendation],
) -> Option<RecommendationSummary> {
    let best = recommendations.first()?;
    let residuals = recommendations.iter().map(|r| r.residual_num);
    let min_residual = residuals.clone().min()?;
    let max_residual = residuals.max()?;

    Some(RecommendationSummary {
        total_combinations_found: recommendations.len(),
        average_price_per_plate: best.total_price_num / Decimal::from(num_plates.max(1)),
        min_residual,
        max_residual,
        stores_count: stores.len(),
        total_dishes_considered: count_dishes(stores),
    })
}

/// Runs a full recommendation. Never fails: invalid input, an empty catalog
/// or an unsatisfiable budget all produce [`RecommendationOutcome::NoCombinations`].
#[must_use]
pub fn recommend(stores: &[Store], req: &RecommendationRequest) -> RecommendationResult {
    let started = Instant::now();

    let outcome = match validate_request(req) {
        Ok(budget) => {
            let mut searcher = req.strategy.searcher(req.seed);
            let recommendations = find_combinations(
                stores,
                budget,
                req.num_plates,
                req.max_results,
                searcher.as_mut(),
            );
            match summarize(stores, req.num_plates, &recommendations) {
                Some(summary) => RecommendationOutcome::Found {
                    summary,
                    recommendations,
                },
                None => RecommendationOutcome::no_combinations(),
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "request rejected before search");
            RecommendationOutcome::no_combinations()
        }
    };

    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        strategy = %req.strategy,
        budget = %req.budget,
        num_plates = req.num_plates,
        found = outcome.recommendations().len(),
        processing_time_ms,
        "recommendation computed"
    );

    RecommendationResult {
        budget: req.budget.clone(),
        num_plates: req.num_plates,
        strategy: req.strategy,
        processing_time_ms,
        outcome,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
