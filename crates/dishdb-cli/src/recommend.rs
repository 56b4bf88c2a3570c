//! `recommend` command: run one search against the catalog and print it.

use anyhow::Context;
use dishdb_core::CatalogStore;
use dishdb_recommend::{
    format_price, recommend, validate_request, RecommendationOutcome, RecommendationRequest,
    RecommendationResult, Strategy,
};

#[derive(Debug)]
pub(crate) struct RecommendArgs {
    pub budget: String,
    pub plates: usize,
    pub algorithm: Strategy,
    pub max_results: usize,
    pub seed: Option<u64>,
    pub json: bool,
}

/// Validates the request, searches the catalog and prints the result.
///
/// # Errors
///
/// Returns an error if the request is invalid, the catalog cannot be read or
/// is empty.
pub(crate) fn run_recommend(catalog: &CatalogStore, args: &RecommendArgs) -> anyhow::Result<()> {
    let request = RecommendationRequest::new(args.budget.clone(), args.plates)
        .with_strategy(args.algorithm)
        .with_max_results(args.max_results)
        .with_seed(args.seed);
    validate_request(&request)?;

    let stores = catalog
        .load()
        .with_context(|| format!("reading {}", catalog.catalog_path().display()))?;
    if stores.is_empty() {
        anyhow::bail!(
            "no stores in {}; run `stores import` first",
            catalog.catalog_path().display()
        );
    }

    let result = recommend(&stores, &request);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    Ok(())
}

/// Human-readable summary followed by one block per combination.
pub(crate) fn render_result(result: &RecommendationResult) -> String {
    let mut lines = vec![format!(
        "Budget: {} | plates: {} | algorithm: {} | {} ms",
        result.budget, result.num_plates, result.strategy, result.processing_time_ms
    )];

    match &result.outcome {
        RecommendationOutcome::NoCombinations {
            message,
            suggestions,
        } => {
            lines.push(message.clone());
            lines.extend(suggestions.iter().map(|s| format!("  - {s}")));
        }
        RecommendationOutcome::Found {
            summary,
            recommendations,
        } => {
            lines.push(format!(
                "Found {} combination(s); {} per plate; residual {} to {}; {} stores, {} dishes considered",
                summary.total_combinations_found,
                format_price(summary.average_price_per_plate),
                format_price(summary.min_residual),
                format_price(summary.max_residual),
                summary.stores_count,
                summary.total_dishes_considered,
            ));
            for (rank, rec) in recommendations.iter().enumerate() {
                lines.push(String::new());
                lines.push(format!(
                    "#{:<3}total {}  residual {}",
                    rank + 1,
                    rec.total_price,
                    rec.residual
                ));
                for plate in &rec.plates {
                    lines.push(format!("    {}", plate.store_name));
                    for group in &plate.products {
                        let dishes: Vec<String> = group
                            .dishes
                            .iter()
                            .map(|d| format!("{} ({})", d.dish.title, d.price_formatted))
                            .collect();
                        lines.push(format!("      {}: {}", group.category, dishes.join(", ")));
                    }
                }
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
