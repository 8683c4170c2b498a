//! Random selections shown alongside the main listing.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Catalog, Place};

/// Default number of related places on a detail page.
pub const DEFAULT_RELATED_LIMIT: usize = 4;

/// Default number of places in the home page recommendations strip.
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 8;

#[derive(Debug)]
pub struct RelatedPlaces<'a> {
    pub places: Vec<&'a Place>,
    /// More same-category places exist than were selected.
    pub has_more: bool,
}

/// Other places in `place`'s category.
///
/// When there are at most `limit` candidates they are returned in catalog
/// order; otherwise `limit` of them are sampled uniformly.
pub fn related_places<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    place: &Place,
    limit: usize,
    rng: &mut R,
) -> RelatedPlaces<'a> {
    let candidates: Vec<&Place> = catalog
        .places_in_category(&place.category_id)
        .filter(|p| p.place_id != place.place_id)
        .collect();

    if candidates.len() <= limit {
        return RelatedPlaces {
            places: candidates,
            has_more: false,
        };
    }

    let places = candidates.choose_multiple(rng, limit).copied().collect();
    RelatedPlaces {
        places,
        has_more: true,
    }
}

/// Up to `count` randomly chosen places, optionally from one category.
pub fn recommendations<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    category: Option<&str>,
    count: usize,
    rng: &mut R,
) -> Vec<&'a Place> {
    let pool: Vec<&Place> = match category {
        Some(id) => catalog.places_in_category(id).collect(),
        None => catalog.places.iter().collect(),
    };
    let mut picked: Vec<&Place> = pool.choose_multiple(rng, count).copied().collect();
    picked.shuffle(rng);
    picked
}
