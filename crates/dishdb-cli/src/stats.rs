use anyhow::Context;
use dishdb_core::CatalogStore;
use dishdb_recommend::{format_price, price_stats, PriceReport, PriceStats};

/// Prints the catalog's price distribution.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub(crate) fn run_stats(catalog: &CatalogStore, json: bool) -> anyhow::Result<()> {
    let stores = catalog
        .load()
        .with_context(|| format!("reading {}", catalog.catalog_path().display()))?;

    match price_stats(&stores) {
        PriceStats::NoData => println!("No price data available"),
        PriceStats::Report(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        PriceStats::Report(report) => print!("{}", render_report(&report)),
    }
    Ok(())
}

pub(crate) fn render_report(report: &PriceReport) -> String {
    let p = &report.percentiles;
    let mut lines = vec![
        format!(
            "{} priced dishes across {} stores",
            report.total_dishes, report.total_stores
        ),
        format!(
            "Range: {} to {} (avg {})",
            format_price(report.price_range.min),
            format_price(report.price_range.max),
            format_price(report.price_range.avg)
        ),
        format!(
            "Percentiles: p10 {} | p25 {} | p50 {} | p75 {} | p90 {}",
            format_price(p.p10),
            format_price(p.p25),
            format_price(p.p50),
            format_price(p.p75),
            format_price(p.p90)
        ),
        String::new(),
        format!(
            "{:<32}{:>7}{:>14}{:>14}{:>14}",
            "STORE", "DISHES", "MIN", "MAX", "AVG"
        ),
    ];
    for store in &report.store_statistics {
        lines.push(format!(
            "{:<32}{:>7}{:>14}{:>14}{:>14}",
            store.name,
            store.dish_count,
            format_price(store.min_price),
            format_price(store.max_price),
            format_price(store.avg_price)
        ));
    }
    lines.push(String::new());
    lines.push(report.suggestions.low_budget.clone());
    lines.push(report.suggestions.medium_budget.clone());
    lines.push(report.suggestions.high_budget.clone());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
