//! Catalog summary figures.

use serde::Serialize;

use crate::filter::place_counts;
use crate::models::Catalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub id: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_categories: usize,
    pub total_places: usize,
    /// In catalog category order.
    pub by_category: Vec<CategoryCount>,
    /// Places whose category id does not resolve.
    pub uncategorized: usize,
}

pub fn catalog_stats(catalog: &Catalog) -> CatalogStats {
    let counts = place_counts(catalog);
    let by_category: Vec<CategoryCount> = catalog
        .categories
        .iter()
        .map(|c| CategoryCount {
            id: c.id.clone(),
            name: c.name.clone(),
            count: counts.get(&c.id).copied().unwrap_or(0),
        })
        .collect();
    let uncategorized = catalog
        .places
        .iter()
        .filter(|p| !catalog.has_category(&p.category_id))
        .count();

    CatalogStats {
        total_categories: catalog.categories.len(),
        total_places: catalog.places.len(),
        by_category,
        uncategorized,
    }
}
