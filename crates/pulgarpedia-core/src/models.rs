//! Catalog data model.
//!
//! These types mirror the JSON document served by the content endpoint:
//! a single [`Catalog`] holding every [`Category`] and every [`Place`].
//! Field names follow the upstream camelCase spelling on the wire.
//!
//! A catalog is loaded as one unit and never edited in place; the store
//! swaps the whole value (behind an `Arc`) when new content arrives.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// A browsable grouping of places (e.g. `"beaches-coast"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// A single tourist destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub place_id: String,
    /// Foreign key into [`Catalog::categories`]. Not guaranteed to resolve
    /// unless the catalog passed strict validation.
    pub category_id: String,
    pub header: PlaceHeader,
    #[serde(default)]
    pub gallery: Vec<GalleryImage>,
    pub general_history_section: GeneralHistorySection,
    pub service_logistic_section: ServiceLogisticSection,
    pub premium_section: PremiumSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceHeader {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Free-text category label carried by the place itself. Used for
    /// display when `category_id` does not resolve.
    #[serde(default)]
    pub category: String,
    #[serde(rename = "mainImageURL", default)]
    pub main_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub image_url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralHistorySection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub history_culture: String,
    pub location_climate: LocationClimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationClimate {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub map_url: Option<String>,
    #[serde(default)]
    pub typical_hours: String,
    #[serde(default)]
    pub best_season: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogisticSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub how_to_get_there: Vec<TransportOption>,
    #[serde(default)]
    pub costs: Vec<Cost>,
    #[serde(default)]
    pub facilities: Facilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportOption {
    pub option: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub item: String,
    pub price: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facilities {
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub restrooms: bool,
    #[serde(default)]
    pub wheelchair_access: bool,
    #[serde(default)]
    pub local_guides: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub premium_title: String,
    #[serde(default)]
    pub content_snippet: String,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub premium_recommendations: Vec<PremiumRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumRecommendation {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub headline: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Tip,
    Food,
    Accommodation,
    Activity,
}

/// The aggregate root: every category and every place, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub places: Vec<Place>,
}

impl Catalog {
    /// Parse a catalog from the raw response body.
    ///
    /// Missing `categories` or `places` arrays are reported as
    /// [`ContentError::Malformed`], as is any structural mismatch inside them.
    pub fn from_json(body: &str) -> Result<Self, ContentError> {
        #[derive(Deserialize)]
        struct Envelope {
            categories: Option<Vec<Category>>,
            places: Option<Vec<Place>>,
        }

        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| ContentError::Malformed(e.to_string()))?;

        let categories = envelope
            .categories
            .ok_or_else(|| ContentError::Malformed("missing `categories`".to_string()))?;
        let places = envelope
            .places
            .ok_or_else(|| ContentError::Malformed("missing `places`".to_string()))?;

        Ok(Self { categories, places })
    }

    pub fn place(&self, place_id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.place_id == place_id)
    }

    /// Like [`place`](Self::place), but a miss is a [`ContentError::PlaceNotFound`].
    pub fn require_place(&self, place_id: &str) -> Result<&Place, ContentError> {
        self.place(place_id)
            .ok_or_else(|| ContentError::PlaceNotFound(place_id.to_string()))
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.category(id).is_some()
    }

    /// Places in category `id`, in catalog order. The returned references
    /// outlive the `id` borrow.
    pub fn places_in_category<'a, 'b>(
        &'a self,
        id: &'b str,
    ) -> impl Iterator<Item = &'a Place> + 'b
    where
        'a: 'b,
    {
        self.places.iter().filter(move |p| p.category_id == id)
    }

    /// Display name for a place's category.
    ///
    /// Falls back to the place's own `header.category` label when its
    /// `category_id` does not resolve.
    pub fn category_label<'a>(&'a self, place: &'a Place) -> &'a str {
        self.category(&place.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(place.header.category.as_str())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: String::new(),
            description: String::new(),
        }
    }

    pub fn place(id: &str, category_id: &str, title: &str) -> Place {
        Place {
            place_id: id.to_string(),
            category_id: category_id.to_string(),
            header: PlaceHeader {
                title: title.to_string(),
                subtitle: String::new(),
                category: "Sin categoría".to_string(),
                main_image_url: format!("/images/{}.jpg", id),
            },
            gallery: Vec::new(),
            general_history_section: GeneralHistorySection {
                title: String::new(),
                description: String::new(),
                history_culture: String::new(),
                location_climate: LocationClimate {
                    address: String::new(),
                    coordinates: None,
                    map_url: None,
                    typical_hours: String::new(),
                    best_season: String::new(),
                },
            },
            service_logistic_section: ServiceLogisticSection {
                title: String::new(),
                description: String::new(),
                how_to_get_there: Vec::new(),
                costs: Vec::new(),
                facilities: Facilities::default(),
            },
            premium_section: PremiumSection {
                title: String::new(),
                is_locked: true,
                premium_title: String::new(),
                content_snippet: String::new(),
                call_to_action: String::new(),
                premium_recommendations: Vec::new(),
            },
        }
    }

    /// 20 places: 3 in `beaches-coast`, 7 in `volcanoes`, 10 in `towns`.
    pub fn sample_catalog() -> Catalog {
        let categories = vec![
            category("beaches-coast", "Playas y Costa"),
            category("volcanoes", "Volcanes"),
            category("towns", "Pueblos"),
        ];
        let mut places = Vec::new();
        for i in 0..3 {
            places.push(place(&format!("beach-{}", i), "beaches-coast", &format!("Playa {}", i)));
        }
        for i in 0..7 {
            places.push(place(&format!("volcano-{}", i), "volcanoes", &format!("Volcán {}", i)));
        }
        for i in 0..10 {
            places.push(place(&format!("town-{}", i), "towns", &format!("Pueblo {}", i)));
        }
        Catalog { categories, places }
    }
}
