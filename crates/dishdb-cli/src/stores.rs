//! `stores` commands: browse, delete, clear and import catalog entries.

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use dishdb_core::{CatalogStore, Category, Store};

/// Sub-commands available under `stores`.
#[derive(Debug, Subcommand)]
pub enum StoresCommands {
    /// List every store with its category and dish counts
    List,
    /// Show one store's menu
    Show {
        /// Store name (case-insensitive)
        name: String,
    },
    /// Remove one store from the catalog
    Delete {
        /// Store name (case-insensitive)
        name: String,
    },
    /// Remove every store from the catalog
    Clear,
    /// Merge a JSON array of categories into a store, creating it if needed
    Import {
        /// Store name (case-insensitive match against existing stores)
        #[arg(long)]
        name: String,
        /// JSON file holding `[{"category": ..., "dishes": [...]}, ...]`
        #[arg(long)]
        file: PathBuf,
        /// Store page URL; replaces the stored one when given
        #[arg(long)]
        url: Option<String>,
    },
}

/// Dispatches one `stores` sub-command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or written, the named store
/// does not exist, or an import file cannot be parsed.
pub(crate) fn run_stores(catalog: &CatalogStore, command: StoresCommands) -> anyhow::Result<()> {
    match command {
        StoresCommands::List => {
            let stores = catalog.load()?;
            if stores.is_empty() {
                println!("no stores in catalog; run `stores import` first");
            } else {
                print!("{}", render_store_list(&stores));
            }
        }
        StoresCommands::Show { name } => {
            let store = catalog
                .find(&name)?
                .ok_or_else(|| anyhow::anyhow!("store '{name}' not found"))?;
            print!("{}", render_store(&store));
        }
        StoresCommands::Delete { name } => {
            if !catalog.remove(&name)? {
                anyhow::bail!("store '{name}' not found");
            }
            println!("deleted store '{name}'");
        }
        StoresCommands::Clear => {
            catalog.clear()?;
            println!("catalog cleared");
        }
        StoresCommands::Import { name, file, url } => {
            let store = import_categories(catalog, &name, &file, url.as_deref())?;
            println!(
                "imported '{}': {} categories, {} dishes",
                store.name,
                store.categories.len(),
                store.dish_count()
            );
        }
    }
    Ok(())
}

/// Reads a category array from `file` and merges it into the named store.
pub(crate) fn import_categories(
    catalog: &CatalogStore,
    name: &str,
    file: &std::path::Path,
    url: Option<&str>,
) -> anyhow::Result<Store> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let categories: Vec<Category> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing categories from {}", file.display()))?;

    catalog.init()?;
    let store = catalog.upsert_categories(name, url, categories)?;
    tracing::info!(store = %store.name, file = %file.display(), "categories imported");
    Ok(store)
}

pub(crate) fn render_store_list(stores: &[Store]) -> String {
    let mut lines = vec![format!(
        "{:<32}{:>11}{:>8}  LAST SCRAPED",
        "STORE", "CATEGORIES", "DISHES"
    )];
    for store in stores {
        let scraped = store.last_scraped.map_or_else(
            || "-".to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        );
        lines.push(format!(
            "{:<32}{:>11}{:>8}  {}",
            store.name,
            store.categories.len(),
            store.dish_count(),
            scraped
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub(crate) fn render_store(store: &Store) -> String {
    let mut lines = vec![store.name.clone()];
    if !store.url.is_empty() {
        lines.push(store.url.clone());
    }
    for category in &store.categories {
        lines.push(String::new());
        lines.push(format!("[{}]", category.name));
        for dish in &category.dishes {
            let price = if dish.price.is_empty() {
                "-"
            } else {
                dish.price.as_str()
            };
            lines.push(format!("  {:<40}{price}", dish.title));
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
