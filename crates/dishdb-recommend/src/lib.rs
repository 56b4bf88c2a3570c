//! Budget-constrained dish recommendation over a store catalog.
//!
//! Pipeline: [`flatten`] the catalog into priced entries, sort them by
//! price, run one of the [`search`] strategies, then [`aggregate`] each
//! combination back into per-store plates. [`engine`] wires the pipeline
//! together for callers; [`stats`] is an independent descriptive report.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod price;
pub mod search;
pub mod stats;

pub use aggregate::{aggregate, CategoryGroup, Plate, PricedDish, Recommendation};
pub use engine::{
    find_combinations, recommend, validate_request, RecommendationOutcome,
    RecommendationRequest, RecommendationResult, RecommendationSummary, DEFAULT_MAX_RESULTS,
};
pub use error::RequestError;
pub use flatten::{flatten_catalog, FlatDish};
pub use price::{format_price, parse_price, CURRENCY_LABEL, MAX_AMOUNT};
pub use search::{
    Combination, CombinationSearch, ExactSearch, GreedySearch, OptimizedSearch, Strategy,
};
pub use stats::{price_stats, PriceReport, PriceStats};
