pub mod app_config;
pub mod catalog;
pub mod config;
pub mod model;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{sanitize_store_file_name, CatalogStore};
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{Category, Dish, Store};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog JSON error at {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
