//! Multi-select category filtering.
//!
//! The filtered view is never stored. [`filter`] derives it from the catalog
//! and the selection on every read, so a change to either input can never
//! leave a stale view behind.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Product};

/// The set of chosen category ids.
///
/// Insertion order is irrelevant; iteration is in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<CategoryId>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `id` if present, otherwise add it.
    ///
    /// Returns whether `id` is selected afterwards. Toggling the same id
    /// twice leaves the selection as it was.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: CategoryId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.0.iter().copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Render as the `categories` query-string value, e.g. `"1,3,4"`.
    ///
    /// Returns `None` for an empty selection so the parameter is omitted.
    #[must_use]
    pub fn to_query_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Parse a `categories` query-string value.
    ///
    /// Blank and non-numeric segments are ignored, so a hand-edited URL never
    /// fails to load.
    #[must_use]
    pub fn parse_query_value(value: &str) -> Self {
        value
            .split(',')
            .filter_map(|segment| segment.parse::<CategoryId>().ok())
            .collect()
    }
}

impl FromIterator<CategoryId> for Selection {
    fn from_iter<I: IntoIterator<Item = CategoryId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Products whose category is in `selection`, in catalog order.
///
/// An empty selection means "show everything" and yields every product.
#[must_use]
pub fn filter<'a>(products: &'a [Product], selection: &Selection) -> Vec<&'a Product> {
    if selection.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|product| selection.contains(product.category_id))
        .collect()
}

/// Case-insensitive substring match on name or description.
///
/// A blank term matches every product.
#[must_use]
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    product.name.to_lowercase().contains(&needle)
        || product.description.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::product;

    fn sample() -> Vec<Product> {
        vec![
            product(1, 10, 100),
            product(2, 20, 100),
            product(3, 10, 100),
            product(4, 30, 100),
            product(5, 20, 100),
        ]
    }

    fn filtered_ids(products: &[Product], selection: &Selection) -> Vec<i64> {
        filter(products, selection)
            .into_iter()
            .map(|p| p.id.as_i64())
            .collect()
    }

    #[test]
    fn test_empty_selection_is_identity() {
        let products = sample();
        let view = filter(&products, &Selection::new());
        assert_eq!(view.len(), products.len());
        for (shown, original) in view.iter().zip(&products) {
            assert_eq!(*shown, original);
        }
    }

    #[test]
    fn test_filter_keeps_exactly_selected_categories_in_order() {
        let products = sample();
        let selection: Selection = [CategoryId::new(10), CategoryId::new(20)]
            .into_iter()
            .collect();

        assert_eq!(filtered_ids(&products, &selection), vec![1, 2, 3, 5]);

        let view = filter(&products, &selection);
        assert!(view.iter().all(|p| selection.contains(p.category_id)));
        let omitted = products
            .iter()
            .filter(|p| selection.contains(p.category_id))
            .count();
        assert_eq!(view.len(), omitted);
    }

    #[test]
    fn test_filter_unknown_category_yields_nothing() {
        let products = sample();
        let selection: Selection = [CategoryId::new(99)].into_iter().collect();
        assert!(filter(&products, &selection).is_empty());
    }

    #[test]
    fn test_toggle_twice_is_noop() {
        let mut selection: Selection = [CategoryId::new(1)].into_iter().collect();
        let before = selection.clone();

        assert!(selection.toggle(CategoryId::new(2)));
        assert!(!selection.toggle(CategoryId::new(2)));
        assert_eq!(selection, before);

        assert!(!selection.toggle(CategoryId::new(1)));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_query_value_round_trip() {
        let selection: Selection = [CategoryId::new(4), CategoryId::new(1), CategoryId::new(3)]
            .into_iter()
            .collect();
        let value = selection.to_query_value().unwrap();
        assert_eq!(value, "1,3,4");
        assert_eq!(Selection::parse_query_value(&value), selection);
    }

    #[test]
    fn test_query_value_empty_and_malformed() {
        assert_eq!(Selection::new().to_query_value(), None);
        let parsed = Selection::parse_query_value("2,,abc, 5 ,");
        assert_eq!(parsed.iter().map(|id| id.as_i64()).collect::<Vec<_>>(), vec![2, 5]);
        assert!(Selection::parse_query_value("").is_empty());
    }

    #[test]
    fn test_matches_search() {
        let mut item = product(1, 1, 100);
        item.name = "Wireless Headphones".to_string();
        item.description = "Noise cancelling".to_string();

        assert!(matches_search(&item, "headphones"));
        assert!(matches_search(&item, "NOISE"));
        assert!(matches_search(&item, "   "));
        assert!(!matches_search(&item, "keyboard"));
    }
}
