//! Category filtering and text search over the loaded catalog.
//!
//! # Algorithm
//!
//! 1. Start from every place, in catalog order.
//! 2. If the selected category is not [`ALL_CATEGORIES`], keep only places
//!    whose `category_id` matches it.
//! 3. If the query is non-blank, fold it with [`normalize_text`] and keep
//!    places where it is a substring of the folded title, subtitle,
//!    description, or address (any one suffices).
//! 4. The surviving places keep their catalog order.
//!
//! [`FilterEngine`] memoizes the last result so repeated requests for the
//! same `(catalog, query, category)` reuse it, and stamps each distinct
//! result with a `revision` that pagination uses to detect a new list.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::models::{Catalog, Place};
use crate::normalize::normalize_text;

/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// The user's current search inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub query: String,
    pub category: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl Filters {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        let mut filters = Self::default();
        filters.set_query(query);
        filters.set_category(category);
        filters
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// An empty category is treated as [`ALL_CATEGORIES`].
    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            ALL_CATEGORIES.to_string()
        } else {
            category
        };
    }

    /// Clear both the query and the category.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_all_categories(&self) -> bool {
        self.category == ALL_CATEGORIES
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn has_active_filters(&self) -> bool {
        self.has_query() || !self.is_all_categories()
    }

    /// The selected category, or `None` for "all".
    pub fn category_filter(&self) -> Option<&str> {
        if self.is_all_categories() {
            None
        } else {
            Some(self.category.as_str())
        }
    }
}

fn matches_query(place: &Place, folded_query: &str) -> bool {
    let fields = [
        place.header.title.as_str(),
        place.header.subtitle.as_str(),
        place.general_history_section.description.as_str(),
        place.general_history_section.location_climate.address.as_str(),
    ];
    fields
        .iter()
        .any(|field| normalize_text(field).contains(folded_query))
}

/// Indices into `catalog.places` of every place passing `filters`.
pub fn filter_indices(catalog: &Catalog, filters: &Filters) -> Vec<usize> {
    let category = filters.category_filter();
    let folded_query = if filters.has_query() {
        Some(normalize_text(&filters.query))
    } else {
        None
    };

    catalog
        .places
        .iter()
        .enumerate()
        .filter(|(_, place)| category.map_or(true, |c| place.category_id == c))
        .filter(|(_, place)| {
            folded_query
                .as_deref()
                .map_or(true, |q| matches_query(place, q))
        })
        .map(|(i, _)| i)
        .collect()
}

/// The places passing `filters`, in catalog order.
pub fn filter_places<'a>(catalog: &'a Catalog, filters: &Filters) -> Vec<&'a Place> {
    filter_indices(catalog, filters)
        .into_iter()
        .map(|i| &catalog.places[i])
        .collect()
}

/// Number of places per category over the whole catalog.
///
/// Independent of any active filter; every known category is present,
/// including ones with zero places.
pub fn place_counts(catalog: &Catalog) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = catalog
        .categories
        .iter()
        .map(|c| (c.id.clone(), 0))
        .collect();
    for place in &catalog.places {
        if let Some(count) = counts.get_mut(&place.category_id) {
            *count += 1;
        }
    }
    counts
}

/// A filter result bound to the catalog it was computed from.
///
/// Cheap to clone: the catalog and the index list are shared.
#[derive(Debug, Clone)]
pub struct FilteredPlaces {
    catalog: Arc<Catalog>,
    indices: Arc<[usize]>,
    revision: u64,
}

impl FilteredPlaces {
    /// Identity of this result; changes whenever the inputs change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> + '_ {
        self.indices.iter().map(move |&i| &self.catalog.places[i])
    }

    /// Places in `[start, end)`, clamped to the result length.
    pub fn range(&self, start: usize, end: usize) -> Vec<&Place> {
        let end = end.min(self.len());
        let start = start.min(end);
        self.indices[start..end]
            .iter()
            .map(|&i| &self.catalog.places[i])
            .collect()
    }
}

struct Memo {
    filters: Filters,
    result: FilteredPlaces,
}

/// Memoizing front end to [`filter_indices`].
#[derive(Default)]
pub struct FilterEngine {
    memo: Option<Memo>,
    revision: u64,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `catalog`, reusing the previous result when the catalog is the
    /// same allocation and the filters are equal.
    pub fn apply(&mut self, catalog: &Arc<Catalog>, filters: &Filters) -> FilteredPlaces {
        if let Some(memo) = &self.memo {
            if Arc::ptr_eq(&memo.result.catalog, catalog) && memo.filters == *filters {
                return memo.result.clone();
            }
        }

        self.revision += 1;
        let result = FilteredPlaces {
            catalog: Arc::clone(catalog),
            indices: filter_indices(catalog, filters).into(),
            revision: self.revision,
        };
        self.memo = Some(Memo {
            filters: filters.clone(),
            result: result.clone(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;

    fn ids(places: &[&Place]) -> Vec<String> {
        places.iter().map(|p| p.place_id.clone()).collect()
    }

    fn izalco_catalog() -> Catalog {
        let mut catalog = sample_catalog();
        let mut izalco = place("izalco", "volcanoes", "Volcan de Izalco");
        izalco.general_history_section.location_climate.address = "Sonsonate".into();
        catalog.places.push(izalco);
        let mut lake = place("coatepeque", "towns", "Lago de Coatepeque");
        lake.header.subtitle = "Cráter lleno de agua".into();
        lake.general_history_section.description = "Un lago volcánico azul".into();
        catalog.places.push(lake);
        catalog
    }

    #[test]
    fn test_no_filters_returns_everything_in_order() {
        let catalog = sample_catalog();
        let result = filter_places(&catalog, &Filters::default());
        assert_eq!(result.len(), 20);
        assert_eq!(result[0].place_id, "beach-0");
        assert_eq!(result[19].place_id, "town-9");
    }

    #[test]
    fn test_category_filter_scenario() {
        let catalog = sample_catalog();
        let filters = Filters::new("", "beaches-coast");
        let result = filter_places(&catalog, &filters);
        assert_eq!(ids(&result), vec!["beach-0", "beach-1", "beach-2"]);
        assert_eq!(place_counts(&catalog)["beaches-coast"], 3);
    }

    #[test]
    fn test_accent_insensitive_query() {
        let catalog = izalco_catalog();
        let result = filter_places(&catalog, &Filters::new("volcán", ALL_CATEGORIES));
        assert!(result.iter().any(|p| p.place_id == "izalco"));
    }

    #[test]
    fn test_query_matches_any_field() {
        let catalog = izalco_catalog();
        // address
        let r = filter_places(&catalog, &Filters::new("SONSONATE", "all"));
        assert_eq!(ids(&r), vec!["izalco"]);
        // subtitle
        let r = filter_places(&catalog, &Filters::new("crater", "all"));
        assert_eq!(ids(&r), vec!["coatepeque"]);
        // description
        let r = filter_places(&catalog, &Filters::new("  azul ", "all"));
        assert_eq!(ids(&r), vec!["coatepeque"]);
    }

    #[test]
    fn test_query_and_category_combine() {
        let catalog = izalco_catalog();
        let r = filter_places(&catalog, &Filters::new("volcan", "towns"));
        // "Lago de Coatepeque" matches via "volcánico" in the description
        assert_eq!(ids(&r), vec!["coatepeque"]);
    }

    #[test]
    fn test_all_sentinel_is_identity() {
        let catalog = izalco_catalog();
        for q in ["", "volcan", "pueblo 3", "zzz"] {
            let with_all = filter_places(&catalog, &Filters::new(q, ALL_CATEGORIES));
            let mut plain = Filters::default();
            plain.set_query(q);
            assert_eq!(ids(&with_all), ids(&filter_places(&catalog, &plain)));
        }
    }

    #[test]
    fn test_every_result_contains_query() {
        let catalog = izalco_catalog();
        let q = "Ó";
        let folded = normalize_text(q);
        let result = filter_places(&catalog, &Filters::new(q, "all"));
        assert!(!result.is_empty());
        for p in &catalog.places {
            let expected = matches_query(p, &folded);
            let included = result.iter().any(|r| r.place_id == p.place_id);
            assert_eq!(expected, included, "place {}", p.place_id);
        }
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let catalog = izalco_catalog();
        let filters = Filters::new("lago", "towns");
        let once: Vec<Place> = filter_places(&catalog, &filters)
            .into_iter()
            .cloned()
            .collect();
        let narrowed = Catalog {
            categories: catalog.categories.clone(),
            places: once.clone(),
        };
        let twice: Vec<Place> = filter_places(&narrowed, &filters)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_place_counts_ignore_selection() {
        let catalog = sample_catalog();
        let counts = place_counts(&catalog);
        assert_eq!(counts["beaches-coast"], 3);
        assert_eq!(counts["volcanoes"], 7);
        assert_eq!(counts["towns"], 10);
    }

    #[test]
    fn test_place_counts_include_empty_categories() {
        let mut catalog = sample_catalog();
        catalog.categories.push(category("festivals", "Festividades"));
        assert_eq!(place_counts(&catalog)["festivals"], 0);
    }

    #[test]
    fn test_filters_state() {
        let mut filters = Filters::default();
        assert!(!filters.has_active_filters());

        filters.set_query("   ");
        assert!(!filters.has_active_filters());

        filters.set_category("towns");
        assert!(filters.has_active_filters());

        filters.set_category("");
        assert!(filters.is_all_categories());

        filters.set_query("playa");
        filters.reset();
        assert_eq!(filters, Filters::default());
    }

    #[test]
    fn test_engine_memoizes_same_inputs() {
        let catalog = Arc::new(sample_catalog());
        let mut engine = FilterEngine::new();
        let filters = Filters::new("pueblo", "all");

        let first = engine.apply(&catalog, &filters);
        let second = engine.apply(&catalog, &filters);
        assert_eq!(first.revision(), second.revision());
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn test_engine_keeps_only_last_inputs() {
        let catalog = Arc::new(sample_catalog());
        let mut engine = FilterEngine::new();
        let towns = Filters::new("", "towns");
        let volcanoes = Filters::new("", "volcanoes");

        let a = engine.apply(&catalog, &towns);
        let b = engine.apply(&catalog, &volcanoes);
        let c = engine.apply(&catalog, &towns);
        assert!(a.revision() < b.revision() && b.revision() < c.revision());
        assert_eq!(engine.apply(&catalog, &towns).revision(), c.revision());
    }

    #[test]
    fn test_engine_new_revision_on_change() {
        let catalog = Arc::new(sample_catalog());
        let mut engine = FilterEngine::new();

        let a = engine.apply(&catalog, &Filters::new("", "towns"));
        let b = engine.apply(&catalog, &Filters::new("", "volcanoes"));
        assert_ne!(a.revision(), b.revision());

        // Same content, different allocation: recomputed.
        let reloaded = Arc::new(sample_catalog());
        let c = engine.apply(&reloaded, &Filters::new("", "volcanoes"));
        assert_ne!(b.revision(), c.revision());
        assert_eq!(b.len(), c.len());
    }

    #[test]
    fn test_filtered_range_clamps() {
        let catalog = Arc::new(sample_catalog());
        let mut engine = FilterEngine::new();
        let result = engine.apply(&catalog, &Filters::default());
        assert_eq!(result.range(18, 40).len(), 2);
        assert!(result.range(25, 30).is_empty());
        assert_eq!(result.iter().count(), 20);
    }
}
