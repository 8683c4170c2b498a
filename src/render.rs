//! HTML rendering.
//!
//! Pages are minijinja templates compiled into the binary. Template names
//! end in `.html`, so every interpolated value is HTML-escaped.

use anyhow::Result;
use minijinja::Environment;
use pulgarpedia_core::{Catalog, Filters, Place};
use serde::Serialize;
use url::form_urlencoded;

use crate::links::SiteUrls;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("cards.html", include_str!("../templates/cards.html")),
    ("place.html", include_str!("../templates/place.html")),
    ("not_found.html", include_str!("../templates/not_found.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("loading.html", include_str!("../templates/loading.html")),
];

/// A place as it appears in a grid or carousel.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceCard {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub category: String,
    pub href: String,
}

impl PlaceCard {
    pub fn new(urls: &SiteUrls, catalog: &Catalog, place: &Place) -> Self {
        Self {
            id: place.place_id.clone(),
            title: place.header.title.clone(),
            subtitle: place.header.subtitle.clone(),
            image: place.header.main_image_url.clone(),
            category: catalog.category_label(place).to_string(),
            href: urls.place_path(&place.place_id),
        }
    }
}

/// One entry of the category filter bar.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryChip {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub count: usize,
    pub selected: bool,
    pub href: String,
}

/// `/?q=..&category=..&page=..`, omitting defaults.
pub fn listing_href(filters: &Filters, page: Option<usize>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if filters.has_query() {
        query.append_pair("q", &filters.query);
    }
    if let Some(category) = filters.category_filter() {
        query.append_pair("category", category);
    }
    if let Some(page) = page {
        query.append_pair("page", &page.to_string());
    }
    let query = query.finish();
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", query)
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub title: String,
    pub description: String,
    pub query: String,
    pub category: String,
    pub categories: Vec<CategoryChip>,
    pub all_count: usize,
    pub cards: Vec<PlaceCard>,
    pub total: usize,
    pub page: usize,
    pub has_more: bool,
    /// No-JS fallback link to the next page.
    pub next_href: Option<String>,
    pub has_active_filters: bool,
    pub recommendations: Vec<PlaceCard>,
}

#[derive(Debug, Serialize)]
pub struct PlacePage<'a> {
    pub title: String,
    pub description: String,
    pub place: &'a Place,
    pub category_label: &'a str,
    pub category_href: String,
    pub related: Vec<PlaceCard>,
    pub has_more_related: bool,
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new(site_name: &str) -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_global("site_name", site_name.to_string());
        Ok(Self { env })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }

    pub fn index(&self, page: &IndexPage) -> Result<String> {
        self.render("index.html", page)
    }

    /// The bare card list appended by infinite scroll.
    pub fn cards(&self, cards: &[PlaceCard]) -> Result<String> {
        self.render("cards.html", minijinja::context! { cards })
    }

    pub fn place(&self, page: &PlacePage<'_>) -> Result<String> {
        self.render("place.html", page)
    }

    pub fn not_found(&self, message: &str) -> Result<String> {
        self.render("not_found.html", minijinja::context! { message })
    }

    pub fn error(&self, message: &str) -> Result<String> {
        self.render("error.html", minijinja::context! { message })
    }

    pub fn loading(&self, refresh_secs: u64) -> Result<String> {
        self.render("loading.html", minijinja::context! { refresh_secs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::new("Pulgarpedia").unwrap()
    }

    fn card(id: &str, title: &str) -> PlaceCard {
        PlaceCard {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            image: format!("/images/{}.jpg", id),
            category: "Volcanes".into(),
            href: format!("/place/{}", id),
        }
    }

    #[test]
    fn test_listing_href() {
        assert_eq!(listing_href(&Filters::default(), None), "/");
        assert_eq!(
            listing_href(&Filters::new("volcán", "all"), Some(2)),
            "/?q=volc%C3%A1n&page=2"
        );
        assert_eq!(
            listing_href(&Filters::new("", "towns"), None),
            "/?category=towns"
        );
    }

    #[test]
    fn test_cards_are_escaped() {
        let html = renderer()
            .cards(&[card("x", "<script>alert(1)</script>")])
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains(r#"href="/place/x""#));
    }

    #[test]
    fn test_error_page_has_retry_form() {
        let html = renderer().error("No se pudo conectar con el servidor").unwrap();
        assert!(html.contains("No se pudo conectar con el servidor"));
        assert!(html.contains(r#"action="/retry""#));
        assert!(html.contains("<title>"));
    }

    #[test]
    fn test_not_found_links_home() {
        let html = renderer()
            .not_found("El lugar que buscas no existe o ha sido removido")
            .unwrap();
        assert!(html.contains(r#"href="/""#));
    }

    #[test]
    fn test_loading_page_refreshes() {
        let html = renderer().loading(2).unwrap();
        assert!(html.contains(r#"http-equiv="refresh""#));
    }
}
