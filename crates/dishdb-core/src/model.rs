//! Catalog data model: stores, their menu categories, and dishes.
//!
//! Field names on the wire follow the JSON document written by the scraper
//! (`nameStore`, `category`, `lastScraped`), so an existing `stores.json`
//! deserializes without any migration step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A restaurant on the delivery platform together with its scraped menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Catalog key. Unique across the catalog when compared case-insensitively.
    #[serde(rename = "nameStore")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// Restaurant metadata captured by the scraper. Never interpreted here.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub restaurant: Value,
    #[serde(
        rename = "lastScraped",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_scraped: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Store {
    /// Case-insensitive comparison against the catalog key.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Number of dishes across all categories, priced or not.
    #[must_use]
    pub fn dish_count(&self) -> usize {
        self.categories.iter().map(|c| c.dishes.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category")]
    pub name: String,
    #[serde(default)]
    pub dishes: Vec<Dish>,
}

/// A single menu item as scraped.
///
/// `price` is kept as the raw, locale-formatted text (e.g. `"119,40 MAD"`);
/// numeric interpretation happens in the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    /// Either an image URL or an `{ data, contentType }` object after base64
    /// conversion.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub image: Value,
    #[serde(default)]
    pub discount: String,
    /// Any other keys the scraper attached (e.g. `originalPrice`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dish {
    /// Two dishes are the same menu entry when title and description match.
    #[must_use]
    pub fn same_entry(&self, other: &Dish) -> bool {
        self.title == other.title && self.description == other.description
    }
}
