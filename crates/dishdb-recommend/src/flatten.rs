//! Projection of the nested store → category → dish catalog into a flat,
//! priced list the search strategies can index into.

use dishdb_core::{Dish, Store};
use rust_decimal::Decimal;

use crate::price::parse_price;

/// One dish of the catalog together with where it came from and its parsed price.
///
/// Borrows from the catalog snapshot; produced fresh for every search.
#[derive(Debug, Clone, Copy)]
pub struct FlatDish<'a> {
    pub store: &'a Store,
    pub category: &'a str,
    pub dish: &'a Dish,
    pub price: Decimal,
}

impl FlatDish<'_> {
    /// Store identity used when a strategy needs to tell stores apart.
    #[must_use]
    pub fn store_key(&self) -> String {
        self.store.name.to_lowercase()
    }
}

/// Flattens the catalog in traversal order, keeping only dishes priced in
/// `(0, budget]`. A non-positive budget yields nothing.
#[must_use]
pub fn flatten_catalog(stores: &[Store], budget: Decimal) -> Vec<FlatDish<'_>> {
    if budget <= Decimal::ZERO {
        return Vec::new();
    }

    let mut flat = Vec::new();
    for store in stores {
        for category in &store.categories {
            for dish in &category.dishes {
                let price = parse_price(&dish.price);
                if price > Decimal::ZERO && price <= budget {
                    flat.push(FlatDish {
                        store,
                        category: &category.name,
                        dish,
                        price,
                    });
                }
            }
        }
    }
    flat
}

/// Stable ascending sort by price.
pub fn sort_by_price(dishes: &mut [FlatDish<'_>]) {
    dishes.sort_by(|a, b| a.price.cmp(&b.price));
}

/// Groups entries per store, stores in first-seen order, each group sorted
/// ascending by price. Stores with no entries do not appear.
#[must_use]
pub fn group_by_store<'a>(dishes: &[FlatDish<'a>]) -> Vec<Vec<FlatDish<'a>>> {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<FlatDish<'a>>> = Vec::new();

    for entry in dishes {
        let key = entry.store_key();
        match keys.iter().position(|k| *k == key) {
            Some(idx) => groups[idx].push(*entry),
            None => {
                keys.push(key);
                groups.push(vec![*entry]);
            }
        }
    }

    for group in &mut groups {
        sort_by_price(group);
    }
    groups
}

/// Every dish in the catalog, priced or not.
#[must_use]
pub fn count_dishes(stores: &[Store]) -> usize {
    stores.iter().map(Store::dish_count).sum()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::search::test_support::{catalog_store, dish};

    #[test]
    fn keeps_only_dishes_within_budget() {
        let stores = vec![catalog_store(
            "Snack",
            vec![(
                "Menu",
                vec![
                    ("Free sauce", "0,00 MAD"),
                    ("Sandwich", "30,00 MAD"),
                    ("Family box", "250,00 MAD"),
                    ("No price", ""),
                    ("Exact budget", "100 MAD"),
                ],
            )],
        )];

        let flat = flatten_catalog(&stores, Decimal::from(100));
        let titles: Vec<&str> = flat.iter().map(|f| f.dish.title.as_str()).collect();
        assert_eq!(titles, vec!["Sandwich", "Exact budget"]);
        assert!(flat
            .iter()
            .all(|f| f.price > Decimal::ZERO && f.price <= Decimal::from(100)));
    }

    #[test]
    fn preserves_traversal_order_across_stores_and_categories() {
        let stores = vec![
            catalog_store(
                "A",
                vec![
                    ("Mains", vec![("A1", "50 MAD")]),
                    ("Drinks", vec![("A2", "10 MAD")]),
                ],
            ),
            catalog_store("B", vec![("Mains", vec![("B1", "20 MAD")])]),
        ];
        let flat = flatten_catalog(&stores, Decimal::from(1000));
        let order: Vec<(&str, &str, &str)> = flat
            .iter()
            .map(|f| (f.store.name.as_str(), f.category, f.dish.title.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("A", "Mains", "A1"), ("A", "Drinks", "A2"), ("B", "Mains", "B1")]
        );
    }

    #[test]
    fn non_positive_budget_yields_nothing() {
        let stores = vec![catalog_store("A", vec![("Mains", vec![("A1", "50 MAD")])])];
        assert!(flatten_catalog(&stores, Decimal::ZERO).is_empty());
        assert!(flatten_catalog(&stores, Decimal::from(-5)).is_empty());
    }

    #[test]
    fn sort_by_price_is_stable() {
        let stores = vec![catalog_store(
            "A",
            vec![(
                "Mains",
                vec![("first", "20 MAD"), ("cheap", "5 MAD"), ("second", "20 MAD")],
            )],
        )];
        let mut flat = flatten_catalog(&stores, Decimal::from(100));
        sort_by_price(&mut flat);
        let titles: Vec<&str> = flat.iter().map(|f| f.dish.title.as_str()).collect();
        assert_eq!(titles, vec!["cheap", "first", "second"]);
    }

    #[test]
    fn group_by_store_merges_case_variants_and_sorts_groups() {
        let mut upper = catalog_store("PIZZA", vec![("Pizzas", vec![("Reine", "69 MAD")])]);
        upper.categories[0].dishes.push(dish("Margherita", "59 MAD"));
        let stores = vec![
            upper,
            catalog_store("Sushi", vec![("Makis", vec![("Maki", "39 MAD")])]),
            catalog_store("pizza", vec![("Desserts", vec![("Tiramisu", "35 MAD")])]),
        ];
        let flat = flatten_catalog(&stores, Decimal::from(100));
        let groups = group_by_store(&flat);

        assert_eq!(groups.len(), 2);
        let prices: Vec<Decimal> = groups[0].iter().map(|f| f.price).collect();
        assert_eq!(
            prices,
            vec![
                Decimal::from_str("35").unwrap(),
                Decimal::from_str("59").unwrap(),
                Decimal::from_str("69").unwrap()
            ]
        );
        assert_eq!(groups[1][0].store.name, "Sushi");
    }

    #[test]
    fn count_dishes_includes_unpriced() {
        let stores = vec![
            catalog_store("A", vec![("Mains", vec![("A1", "50 MAD"), ("A2", "")])]),
            catalog_store("B", vec![]),
        ];
        assert_eq!(count_dishes(&stores), 2);
    }
}
