//! Flat-file catalog store.
//!
//! The whole catalog lives in a single `stores.json` document (an array of
//! [`Store`]). Each write also refreshes a per-store export file next to it.
//! Store lookups are case-insensitive on the store name; category merging is
//! exact on the category name.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::model::{Category, Store};
use crate::CatalogError;

const CATALOG_FILE_NAME: &str = "stores.json";

#[derive(Debug, Clone)]
pub struct CatalogStore {
    data_dir: PathBuf,
}

impl CatalogStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILE_NAME)
    }

    /// Create the data directory and an empty catalog if either is missing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory or file cannot be created.
    pub fn init(&self) -> Result<(), CatalogError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| io_error(&self.data_dir, e))?;
        let path = self.catalog_path();
        if !path.exists() {
            self.save(&[])?;
            tracing::info!(path = %path.display(), "initialized empty catalog");
        }
        Ok(())
    }

    /// Read the full catalog. A missing catalog file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Vec<Store>, CatalogError> {
        let path = self.catalog_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&content).map_err(|e| json_error(&path, e))
    }

    /// Replace the catalog on disk.
    ///
    /// The document is written to a sibling temp file and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on serialization or I/O failure.
    pub fn save(&self, stores: &[Store]) -> Result<(), CatalogError> {
        let path = self.catalog_path();
        write_json_atomically(&path, stores)?;
        tracing::debug!(path = %path.display(), stores = stores.len(), "saved catalog");
        Ok(())
    }

    /// Find a store by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Propagates [`CatalogStore::load`] failures.
    pub fn find(&self, name: &str) -> Result<Option<Store>, CatalogError> {
        Ok(self.load()?.into_iter().find(|s| s.matches_name(name)))
    }

    /// Delete every store whose name matches case-insensitively.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Errors
    ///
    /// Propagates load/save failures.
    pub fn remove(&self, name: &str) -> Result<bool, CatalogError> {
        let stores = self.load()?;
        let before = stores.len();
        let kept: Vec<Store> = stores.into_iter().filter(|s| !s.matches_name(name)).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.save(&kept)?;
        tracing::info!(store = %name, remaining = kept.len(), "deleted store");
        Ok(true)
    }

    /// Empty the catalog.
    ///
    /// # Errors
    ///
    /// Propagates save failures.
    pub fn clear(&self) -> Result<(), CatalogError> {
        self.save(&[])?;
        tracing::info!("cleared catalog");
        Ok(())
    }

    /// Merge freshly scraped categories into the catalog.
    ///
    /// An existing store (matched case-insensitively) keeps its categories;
    /// incoming categories with the same name contribute only dishes not
    /// already present (same title and description), and unknown categories
    /// are appended. A store not yet in the catalog is created. The store's
    /// `last_scraped` is refreshed and `url` replaced when provided.
    ///
    /// # Errors
    ///
    /// Propagates load/save failures. A failure writing the per-store export
    /// file is logged and ignored.
    pub fn upsert_categories(
        &self,
        name: &str,
        url: Option<&str>,
        categories: Vec<Category>,
    ) -> Result<Store, CatalogError> {
        let mut stores = self.load()?;
        let now = Utc::now();

        let position = stores.iter().position(|s| s.matches_name(name));
        let updated = if let Some(index) = position {
            let existing = &mut stores[index];
            merge_categories(&mut existing.categories, categories);
            existing.last_scraped = Some(now);
            if let Some(url) = url {
                existing.url = url.to_string();
            }
            tracing::info!(
                store = %existing.name,
                categories = existing.categories.len(),
                dishes = existing.dish_count(),
                "updated existing store"
            );
            existing.clone()
        } else {
            let store = Store {
                name: name.to_string(),
                url: url.unwrap_or_default().to_string(),
                restaurant: serde_json::Value::Null,
                last_scraped: Some(now),
                categories,
            };
            tracing::info!(
                store = %store.name,
                categories = store.categories.len(),
                dishes = store.dish_count(),
                "created new store"
            );
            stores.push(store.clone());
            store
        };

        self.save(&stores)?;

        let export = self
            .data_dir
            .join(format!("{}.json", sanitize_store_file_name(&updated.name)));
        if let Err(e) = write_json_atomically(&export, &updated) {
            tracing::warn!(error = %e, "failed to write per-store export file");
        }

        Ok(updated)
    }
}

/// Merge `incoming` into `existing` by exact category name.
///
/// Returns the number of dishes added.
pub fn merge_categories(existing: &mut Vec<Category>, incoming: Vec<Category>) -> usize {
    let mut added = 0;
    for category in incoming {
        match existing.iter().position(|c| c.name == category.name) {
            Some(index) => {
                let current = &mut existing[index];
                for dish in category.dishes {
                    if !current.dishes.iter().any(|d| d.same_entry(&dish)) {
                        current.dishes.push(dish);
                        added += 1;
                    }
                }
            }
            None => {
                added += category.dishes.len();
                existing.push(category);
            }
        }
    }
    added
}

/// File-name-safe form of a store name: non-alphanumerics become `_`, then lowercase.
#[must_use]
pub fn sanitize_store_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

fn write_json_atomically<T: serde::Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| json_error(path, e))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> CatalogError {
    CatalogError::Json {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
