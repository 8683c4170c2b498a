//! Filtered, paginated listings.
//!
//! Shared by the `search` CLI command, `GET /api/places`, and the HTML
//! catalog page. A listing is the displayed prefix of the filtered places:
//! page `n` shows the first `n * page_size` results.

use std::collections::BTreeMap;

use anyhow::Result;
use pulgarpedia_core::filter::place_counts;
use pulgarpedia_core::{Catalog, FilterEngine, FilteredPlaces, Filters, Pagination, Place};
use serde::Serialize;

use crate::client::load_catalog;
use crate::config::Config;

/// Compact view of a place for listings.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceSummary {
    pub place_id: String,
    pub category_id: String,
    pub category: String,
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub address: String,
}

impl PlaceSummary {
    pub fn new(catalog: &Catalog, place: &Place) -> Self {
        Self {
            place_id: place.place_id.clone(),
            category_id: place.category_id.clone(),
            category: catalog.category_label(place).to_string(),
            title: place.header.title.clone(),
            subtitle: place.header.subtitle.clone(),
            image_url: place.header.main_image_url.clone(),
            address: place
                .general_history_section
                .location_climate
                .address
                .clone(),
        }
    }
}

/// Response body of `GET /api/places`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<PlaceSummary>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
    /// Places per category over the whole catalog, independent of filters.
    pub counts: BTreeMap<String, usize>,
    pub has_active_filters: bool,
}

/// A category filter naming a category the catalog does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

/// Reject filters whose category is neither "all" nor a known id.
pub fn check_category(catalog: &Catalog, filters: &Filters) -> Result<(), UnknownCategory> {
    match filters.category_filter() {
        Some(id) if !catalog.has_category(id) => Err(UnknownCategory(id.to_string())),
        _ => Ok(()),
    }
}

pub fn search_page(
    filtered: &FilteredPlaces,
    filters: &Filters,
    page: usize,
    page_size: usize,
) -> SearchPage {
    let pagination = Pagination::resume(page_size, filtered.revision(), page);
    let total = filtered.len();
    let catalog = filtered.catalog();

    let items = filtered
        .range(0, pagination.displayed_len(total))
        .into_iter()
        .map(|place| PlaceSummary::new(catalog, place))
        .collect();

    SearchPage {
        items,
        total,
        page: pagination.page(),
        page_size: pagination.page_size(),
        has_more: pagination.has_more(total),
        counts: place_counts(catalog),
        has_active_filters: filters.has_active_filters(),
    }
}

/// CLI entry point for `pulgarpedia search`.
pub async fn run_search(
    config: &Config,
    query: Option<String>,
    category: Option<String>,
    page: usize,
) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let filters = Filters::new(query.unwrap_or_default(), category.unwrap_or_default());

    if let Err(UnknownCategory(id)) = check_category(&catalog, &filters) {
        anyhow::bail!("unknown category: {}", id);
    }

    let filtered = FilterEngine::new().apply(&catalog, &filters);
    let result = search_page(&filtered, &filters, page, config.catalog.page_size);

    if result.items.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, item) in result.items.iter().enumerate() {
        println!("{}. {}  [{}]", i + 1, item.title, item.category);
        println!("    id: {}", item.place_id);
        if !item.subtitle.is_empty() {
            println!("    {}", item.subtitle);
        }
        if !item.address.is_empty() {
            println!("    {}", item.address);
        }
        println!();
    }

    println!(
        "Showing {} of {} place(s) (page {}).",
        result.items.len(),
        result.total,
        result.page
    );
    if result.has_more {
        println!("Use --page {} to see more.", result.page + 1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const BODY: &str = include_str!("../tests/fixtures/catalog.json");

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_json(BODY).unwrap())
    }

    #[test]
    fn test_first_page() {
        let catalog = catalog();
        let filters = Filters::default();
        let filtered = FilterEngine::new().apply(&catalog, &filters);

        let page = search_page(&filtered, &filters, 1, 12);
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 12);
        assert!(page.has_more);
        assert!(!page.has_active_filters);
        assert_eq!(page.counts["beaches-coast"], 3);
    }

    #[test]
    fn test_second_page_reveals_the_rest() {
        let catalog = catalog();
        let filters = Filters::default();
        let filtered = FilterEngine::new().apply(&catalog, &filters);

        let page = search_page(&filtered, &filters, 2, 12);
        assert_eq!(page.items.len(), 20);
        assert!(!page.has_more);
    }

    #[test]
    fn test_category_counts_ignore_selection() {
        let catalog = catalog();
        let filters = Filters::new("", "beaches-coast");
        let filtered = FilterEngine::new().apply(&catalog, &filters);

        let page = search_page(&filtered, &filters, 1, 12);
        assert_eq!(page.total, 3);
        assert_eq!(page.counts["beaches-coast"], 3);
        assert_eq!(page.counts["volcanoes"], 7);
        assert!(page.has_active_filters);
        assert!(page.items.iter().all(|p| p.category == "Playas y Costa"));
    }

    #[test]
    fn test_accent_insensitive_query() {
        let catalog = catalog();
        let filters = Filters::new("volcán", "all");
        let filtered = FilterEngine::new().apply(&catalog, &filters);

        let page = search_page(&filtered, &filters, 1, 12);
        assert!(page.items.iter().any(|p| p.place_id == "izalco"));
    }

    #[test]
    fn test_unknown_category() {
        let catalog = catalog();
        assert_eq!(
            check_category(&catalog, &Filters::new("", "caves")),
            Err(UnknownCategory("caves".into()))
        );
        assert!(check_category(&catalog, &Filters::new("", "all")).is_ok());
        assert!(check_category(&catalog, &Filters::new("", "towns")).is_ok());
    }
}
