mod recommend;
mod stats;
mod stores;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dishdb_core::{AppConfig, CatalogStore};
use dishdb_recommend::Strategy;
use tracing_subscriber::EnvFilter;

use crate::stores::StoresCommands;

#[derive(Debug, Parser)]
#[command(name = "dishdb-cli")]
#[command(about = "Budget dish recommendations over a scraped restaurant catalog")]
struct Cli {
    /// Catalog directory; overrides `DISHDB_DATA_DIR`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find dish combinations that fit a budget
    Recommend {
        /// Total budget, e.g. "300 MAD" or 300
        #[arg(long)]
        budget: String,
        /// Number of dishes per combination
        #[arg(long)]
        plates: usize,
        /// Search strategy: exact, optimized or greedy
        #[arg(long, default_value_t = Strategy::Optimized)]
        algorithm: Strategy,
        /// Maximum combinations to show (defaults to `DISHDB_DEFAULT_MAX_RESULTS`)
        #[arg(long)]
        max: Option<usize>,
        /// Seed for the greedy strategy
        #[arg(long)]
        seed: Option<u64>,
        /// Print the raw JSON result instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Price distribution across the catalog
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Inspect and maintain the store catalog
    Stores {
        #[command(subcommand)]
        command: StoresCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Parse first so `--help` and usage errors never depend on the environment.
    let cli = Cli::parse();

    let config = dishdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli, &config)
}

fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let catalog = CatalogStore::new(cli.data_dir.unwrap_or_else(|| config.data_dir.clone()));

    match cli.command {
        Some(Commands::Recommend {
            budget,
            plates,
            algorithm,
            max,
            seed,
            json,
        }) => {
            let args = recommend::RecommendArgs {
                budget,
                plates,
                algorithm,
                max_results: max.unwrap_or(config.default_max_results),
                seed,
                json,
            };
            recommend::run_recommend(&catalog, &args)?;
        }
        Some(Commands::Stats { json }) => stats::run_stats(&catalog, json)?,
        Some(Commands::Stores { command }) => stores::run_stores(&catalog, command)?,
        None => println!("dishdb-cli: run with --help to list commands"),
    }

    Ok(())
}
