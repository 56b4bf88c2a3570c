//! Descriptive price statistics over the whole catalog.
//!
//! Percentiles use the nearest-rank index `floor(n * p)` into the ascending
//! price list, without interpolation.

use dishdb_core::Store;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::price::{format_price, parse_price, serialize_formatted};

/// Per-store summaries kept in a report, in catalog order.
pub const STORE_SUMMARY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum PriceStats {
    /// No dish in the catalog carries a positive price.
    NoData,
    Report(PriceReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub total_stores: usize,
    /// Priced dishes only.
    pub total_dishes: usize,
    pub price_range: PriceRange,
    pub percentiles: Percentiles,
    pub store_statistics: Vec<StoreSummary>,
    pub suggestions: BudgetSuggestions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    #[serde(serialize_with = "serialize_formatted")]
    pub min: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub max: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub avg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentiles {
    #[serde(serialize_with = "serialize_formatted")]
    pub p10: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub p25: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub p50: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub p75: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub p90: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    #[serde(rename = "nameStore")]
    pub name: String,
    pub dish_count: usize,
    #[serde(serialize_with = "serialize_formatted")]
    pub min_price: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub max_price: Decimal,
    #[serde(serialize_with = "serialize_formatted")]
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSuggestions {
    pub low_budget: String,
    pub medium_budget: String,
    pub high_budget: String,
}

/// Value at index `floor(n * pct / 100)` of an ascending slice, clamped to
/// the last element. `None` for an empty slice.
#[must_use]
pub fn percentile(sorted: &[Decimal], pct: usize) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let idx = (sorted.len() * pct / 100).min(last);
    Some(sorted[idx])
}

/// Min, max and mean of a non-empty slice.
fn range_of(prices: &[Decimal]) -> Option<PriceRange> {
    let min = prices.iter().min().copied()?;
    let max = prices.iter().max().copied()?;
    let sum: Decimal = prices.iter().sum();
    let avg = sum / Decimal::from(prices.len());
    Some(PriceRange { min, max, avg })
}

/// Plates a budget of `amount` buys at the average price, at least one.
fn plates_for(amount: Decimal, avg: Decimal) -> Decimal {
    if avg <= Decimal::ZERO {
        return Decimal::ONE;
    }
    (amount / avg).floor().max(Decimal::ONE)
}

/// Single pass over the catalog collecting every positive price.
#[must_use]
pub fn price_stats(stores: &[Store]) -> PriceStats {
    let mut all_prices: Vec<Decimal> = Vec::new();
    let mut store_statistics: Vec<StoreSummary> = Vec::new();

    for store in stores {
        let store_prices: Vec<Decimal> = store
            .categories
            .iter()
            .flat_map(|c| &c.dishes)
            .map(|d| parse_price(&d.price))
            .filter(|p| *p > Decimal::ZERO)
            .collect();

        if let Some(range) = range_of(&store_prices) {
            store_statistics.push(StoreSummary {
                name: store.name.clone(),
                dish_count: store_prices.len(),
                min_price: range.min,
                max_price: range.max,
                avg_price: range.avg,
            });
        }
        all_prices.extend(store_prices);
    }

    all_prices.sort();
    let Some(price_range) = range_of(&all_prices) else {
        return PriceStats::NoData;
    };

    // Non-empty here, so every percentile exists.
    let at = |pct| percentile(&all_prices, pct).unwrap_or(Decimal::ZERO);
    let percentiles = Percentiles {
        p10: at(10),
        p25: at(25),
        p50: at(50),
        p75: at(75),
        p90: at(90),
    };

    let avg = price_range.avg;
    let suggestions = BudgetSuggestions {
        low_budget: format!(
            "For budget under {}, try {} plates",
            format_price(percentiles.p25),
            plates_for(percentiles.p25, avg)
        ),
        medium_budget: format!(
            "For budget around {}, try {} plates",
            format_price(percentiles.p50),
            plates_for(percentiles.p50, avg)
        ),
        high_budget: format!(
            "For budget over {}, try {} plates",
            format_price(percentiles.p75),
            plates_for(percentiles.p75, avg)
        ),
    };

    store_statistics.truncate(STORE_SUMMARY_LIMIT);

    PriceStats::Report(PriceReport {
        total_stores: stores.len(),
        total_dishes: all_prices.len(),
        price_range,
        percentiles,
        store_statistics,
        suggestions,
    })
}
