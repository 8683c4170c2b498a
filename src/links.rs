//! Absolute URLs for the public site.

use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid site base URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("site base URL cannot have paths: {}", base_url);
        }
        Ok(Self { base })
    }

    pub fn home(&self) -> String {
        self.base.to_string()
    }

    fn place_url(&self, place_id: &str) -> Url {
        let mut url = self.base.clone();
        // new() rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("place").push(place_id);
        }
        url
    }

    /// `<base>/place/<id>`, with the id percent-encoded as a path segment.
    pub fn place(&self, place_id: &str) -> String {
        self.place_url(place_id).to_string()
    }

    /// Path-only form of [`place`](Self::place), for links within the site.
    pub fn place_path(&self, place_id: &str) -> String {
        self.place_url(place_id).path().to_string()
    }

    /// `<base>?category=<id>`.
    pub fn category(&self, category_id: &str) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("category", category_id);
        url.to_string()
    }
}
