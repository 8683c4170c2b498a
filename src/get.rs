//! Place detail lookup.
//!
//! Used by `GET /place/{placeId}`, `GET /api/places/{placeId}`, and the
//! `get` CLI command.

use anyhow::Result;
use pulgarpedia_core::related::{related_places, RelatedPlaces};
use pulgarpedia_core::{Catalog, ContentError, Place};
use rand::Rng;

use crate::client::load_catalog;
use crate::config::Config;

/// A place plus everything its detail page shows around it.
#[derive(Debug)]
pub struct PlaceDetail<'a> {
    pub place: &'a Place,
    pub category_label: &'a str,
    pub related: RelatedPlaces<'a>,
}

/// Look up `place_id`, picking up to `related_limit` related places.
pub fn place_detail<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    place_id: &str,
    related_limit: usize,
    rng: &mut R,
) -> Result<PlaceDetail<'a>, ContentError> {
    let place = catalog.require_place(place_id)?;
    Ok(PlaceDetail {
        place,
        category_label: catalog.category_label(place),
        related: related_places(catalog, place, related_limit, rng),
    })
}

/// CLI entry point for `pulgarpedia get`.
pub async fn run_get(config: &Config, place_id: &str) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let detail = place_detail(
        &catalog,
        place_id,
        config.catalog.related_limit,
        &mut rand::thread_rng(),
    )?;
    let place = detail.place;
    let history = &place.general_history_section;
    let logistics = &place.service_logistic_section;

    println!("--- Place ---");
    println!("id:        {}", place.place_id);
    println!("title:     {}", place.header.title);
    if !place.header.subtitle.is_empty() {
        println!("subtitle:  {}", place.header.subtitle);
    }
    println!("category:  {} ({})", detail.category_label, place.category_id);
    println!("address:   {}", history.location_climate.address);
    if let Some(coords) = &history.location_climate.coordinates {
        println!("coords:    {}, {}", coords.latitude, coords.longitude);
    }
    if !history.location_climate.best_season.is_empty() {
        println!("season:    {}", history.location_climate.best_season);
    }
    println!("images:    {}", place.gallery.len() + 1);
    println!();

    if !history.description.is_empty() {
        println!("{}", history.description);
        println!();
    }

    if !logistics.costs.is_empty() {
        println!("--- Costs ---");
        for cost in &logistics.costs {
            println!("  {}: {}", cost.item, cost.price);
        }
        println!();
    }

    if !detail.related.places.is_empty() {
        println!("--- Related ---");
        for related in &detail.related.places {
            println!("  {}  ({})", related.header.title, related.place_id);
        }
    }

    Ok(())
}
