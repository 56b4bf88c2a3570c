//! Regrouping of a flat [`Combination`] back into the catalog's shape.

use dishdb_core::Dish;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::price::format_price;
use crate::search::Combination;

/// One recommended combination, ready to be rendered or serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub plates: Vec<Plate>,
    /// Formatted total, e.g. `"110,00 MAD"`.
    pub total_price: String,
    /// Formatted `budget - total`.
    pub residual: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price_num: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub residual_num: Decimal,
}

/// The dishes taken from a single store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plate {
    #[serde(rename = "nameStore")]
    pub store_name: String,
    pub url: String,
    pub restaurant: Value,
    pub products: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub dishes: Vec<PricedDish>,
}

/// A catalog dish annotated with its parsed and normalized price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedDish {
    #[serde(flatten)]
    pub dish: Dish,
    #[serde(rename = "priceNum", with = "rust_decimal::serde::float")]
    pub price_num: Decimal,
    #[serde(rename = "priceFormatted")]
    pub price_formatted: String,
}

impl PricedDish {
    /// Keys the annotation owns; stale copies in `extra` are dropped so the
    /// flattened output never repeats them.
    const ANNOTATION_KEYS: [&'static str; 2] = ["priceNum", "priceFormatted"];

    fn new(dish: &Dish, price: Decimal) -> Self {
        let mut dish = dish.clone();
        for key in Self::ANNOTATION_KEYS {
            dish.extra.remove(key);
        }
        Self {
            dish,
            price_num: price,
            price_formatted: format_price(price),
        }
    }
}

/// Groups the combination by store (first-seen order), then by category
/// within each store (first-seen order).
///
/// Returns `None` for an empty combination or one whose total exceeds
/// `budget`; such input means a search produced something invalid and it is
/// dropped rather than shown.
#[must_use]
pub fn aggregate(combination: &Combination<'_>, budget: Decimal) -> Option<Recommendation> {
    if combination.is_empty() {
        tracing::warn!("dropping empty combination");
        return None;
    }
    let total = combination.total();
    if total > budget {
        tracing::warn!(%total, %budget, "dropping combination over budget");
        return None;
    }

    let mut plates: Vec<Plate> = Vec::new();
    for entry in &combination.entries {
        let store_idx = match plates.iter().position(|p| p.store_name == entry.store.name) {
            Some(idx) => idx,
            None => {
                plates.push(Plate {
                    store_name: entry.store.name.clone(),
                    url: entry.store.url.clone(),
                    restaurant: entry.store.restaurant.clone(),
                    products: Vec::new(),
                });
                plates.len() - 1
            }
        };

        let products = &mut plates[store_idx].products;
        let category_idx = match products.iter().position(|g| g.category == entry.category) {
            Some(idx) => idx,
            None => {
                products.push(CategoryGroup {
                    category: entry.category.to_string(),
                    dishes: Vec::new(),
                });
                products.len() - 1
            }
        };

        products[category_idx]
            .dishes
            .push(PricedDish::new(entry.dish, entry.price));
    }

    let residual = budget - total;
    Some(Recommendation {
        plates,
        total_price: format_price(total),
        residual: format_price(residual),
        total_price_num: total,
        residual_num: residual,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::flatten::flatten_catalog;
    use crate::search::test_support::catalog_store;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal literal")
    }

    #[test]
    fn regroups_by_store_then_category() {
        let stores = vec![
            catalog_store(
                "Pizza Hut",
                vec![
                    ("Pizzas", vec![("Margherita", "59,00 MAD")]),
                    ("Drinks", vec![("Coca", "12,00 MAD")]),
                ],
            ),
            catalog_store("Sushi Box", vec![("Makis", vec![("Maki", "39,00 MAD")])]),
        ];
        let flat = flatten_catalog(&stores, dec("200"));
        // Interleave stores to check first-seen grouping.
        let combination = Combination::new(vec![flat[0], flat[2], flat[1]]);

        let rec = aggregate(&combination, dec("200")).expect("within budget");

        assert_eq!(rec.plates.len(), 2);
        let pizza = &rec.plates[0];
        assert_eq!(pizza.store_name, "Pizza Hut");
        assert_eq!(pizza.url, "https://glovoapp.com/ma/fr/casablanca/pizza hut");
        let categories: Vec<&str> = pizza.products.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["Pizzas", "Drinks"]);
        assert_eq!(pizza.products[0].dishes[0].dish.title, "Margherita");
        assert_eq!(pizza.products[1].dishes[0].dish.title, "Coca");

        let sushi = &rec.plates[1];
        assert_eq!(sushi.store_name, "Sushi Box");
        assert_eq!(sushi.products.len(), 1);
        assert_eq!(sushi.products[0].dishes[0].dish.title, "Maki");

        let dish_count: usize = rec
            .plates
            .iter()
            .flat_map(|p| &p.products)
            .map(|g| g.dishes.len())
            .sum();
        assert_eq!(dish_count, 3);
        assert_eq!(rec.total_price, "110,00 MAD");
        assert_eq!(rec.residual, "90,00 MAD");
        assert_eq!(rec.total_price_num, dec("110"));
        assert_eq!(rec.residual_num, dec("90"));
    }

    #[test]
    fn same_category_collects_multiple_dishes() {
        let stores = vec![catalog_store(
            "Tacos de Lyon",
            vec![("Tacos", vec![("Tacos M", "35 MAD"), ("Tacos XL", "55,50 MAD")])],
        )];
        let flat = flatten_catalog(&stores, dec("100"));
        let rec = aggregate(&Combination::new(flat.clone()), dec("100")).expect("within budget");

        assert_eq!(rec.plates.len(), 1);
        assert_eq!(rec.plates[0].products.len(), 1);
        assert_eq!(rec.plates[0].products[0].dishes.len(), 2);
        assert_eq!(rec.plates[0].products[0].dishes[1].price_formatted, "55,50 MAD");
        assert_eq!(rec.residual, "9,50 MAD");
    }

    #[test]
    fn over_budget_or_empty_is_dropped() {
        let stores = vec![catalog_store("A", vec![("Menu", vec![("Big", "80 MAD")])])];
        let flat = flatten_catalog(&stores, dec("100"));
        assert!(aggregate(&Combination::new(flat), dec("50")).is_none());
        assert!(aggregate(&Combination::new(Vec::new()), dec("50")).is_none());
    }

    #[test]
    fn stale_price_annotations_in_catalog_are_replaced() {
        let mut stores = vec![catalog_store("A", vec![("Menu", vec![("Harira", "15,00 MAD")])])];
        let extra = &mut stores[0].categories[0].dishes[0].extra;
        extra.insert("priceNum".to_string(), serde_json::json!(99));
        extra.insert("priceFormatted".to_string(), serde_json::json!("99,00 MAD"));
        extra.insert("originalPrice".to_string(), serde_json::json!("20,00 MAD"));

        let flat = flatten_catalog(&stores, dec("100"));
        let rec = aggregate(&Combination::new(flat), dec("100")).expect("within budget");
        let json = serde_json::to_string(&rec.plates[0].products[0].dishes[0]).expect("serialize");

        assert_eq!(json.matches("\"priceNum\"").count(), 1, "{json}");
        assert_eq!(json.matches("\"priceFormatted\"").count(), 1, "{json}");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["priceNum"], 15.0);
        assert_eq!(value["priceFormatted"], "15,00 MAD");
        assert_eq!(value["originalPrice"], "20,00 MAD");
    }

    #[test]
    fn serializes_with_catalog_field_names() {
        let stores = vec![catalog_store("A", vec![("Menu", vec![("Tajine", "45,00 MAD")])])];
        let flat = flatten_catalog(&stores, dec("100"));
        let rec = aggregate(&Combination::new(flat), dec("100")).expect("within budget");

        let json = serde_json::to_value(&rec).expect("serializable");
        assert_eq!(json["plates"][0]["nameStore"], "A");
        let dish = &json["plates"][0]["products"][0]["dishes"][0];
        assert_eq!(dish["title"], "Tajine");
        assert_eq!(dish["price"], "45,00 MAD");
        assert_eq!(dish["priceNum"], 45.0);
        assert_eq!(dish["priceFormatted"], "45,00 MAD");
        assert_eq!(json["residual_num"], 55.0);
    }
}
