//! XML sitemap generation.
//!
//! The sitemap lists the home page, one entry per place (with its main
//! image), and one entry per category filter. It is built from a fresh
//! fetch every time; if that fetch fails, a home-only sitemap is produced
//! so crawlers never see an error.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use pulgarpedia_core::validate::validate;
use pulgarpedia_core::{Catalog, ContentSource, IntegrityMode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::links::SiteUrls;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// A rendered sitemap.
#[derive(Debug, Clone)]
pub struct Sitemap {
    pub xml: String,
    /// `false` when the catalog could not be fetched and only the home
    /// page is listed.
    pub complete: bool,
}

struct UrlEntry<'a> {
    loc: String,
    changefreq: &'static str,
    priority: &'static str,
    image: Option<ImageEntry<'a>>,
}

struct ImageEntry<'a> {
    loc: &'a str,
    title: &'a str,
    caption: &'a str,
}

type XmlWriter = Writer<Vec<u8>>;

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_url(writer: &mut XmlWriter, entry: &UrlEntry<'_>, lastmod: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    text_element(writer, "loc", &entry.loc)?;
    text_element(writer, "lastmod", lastmod)?;
    text_element(writer, "changefreq", entry.changefreq)?;
    text_element(writer, "priority", entry.priority)?;
    if let Some(image) = &entry.image {
        writer.write_event(Event::Start(BytesStart::new("image:image")))?;
        text_element(writer, "image:loc", image.loc)?;
        text_element(writer, "image:title", image.title)?;
        text_element(writer, "image:caption", image.caption)?;
        writer.write_event(Event::End(BytesEnd::new("image:image")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

/// Render the sitemap for `catalog`, or the home-only fallback for `None`.
pub fn render_sitemap(
    urls: &SiteUrls,
    catalog: Option<&Catalog>,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let lastmod = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut entries = vec![UrlEntry {
        loc: urls.home(),
        changefreq: "daily",
        priority: "1.0",
        image: None,
    }];

    if let Some(catalog) = catalog {
        for place in &catalog.places {
            entries.push(UrlEntry {
                loc: urls.place(&place.place_id),
                changefreq: "weekly",
                priority: "0.8",
                image: Some(ImageEntry {
                    loc: &place.header.main_image_url,
                    title: &place.header.title,
                    caption: &place.header.subtitle,
                }),
            });
        }
        for category in &catalog.categories {
            entries.push(UrlEntry {
                loc: urls.category(&category.id),
                changefreq: "weekly",
                priority: "0.7",
                image: None,
            });
        }
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    if catalog.is_some() {
        urlset.push_attribute(("xmlns:image", IMAGE_NS));
    }
    writer.write_event(Event::Start(urlset))?;
    for entry in &entries {
        write_url(&mut writer, entry, &lastmod)?;
    }
    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Fetch the catalog from `source` and render the sitemap, falling back to
/// the home-only variant when the fetch or validation fails.
pub async fn generate_sitemap(
    urls: &SiteUrls,
    source: &dyn ContentSource,
    integrity: IntegrityMode,
) -> Result<Sitemap> {
    let fetched = match source.fetch().await {
        Ok(catalog) => validate(&catalog, integrity).map(|()| catalog),
        Err(e) => Err(e),
    };

    let now = Utc::now();
    match fetched {
        Ok(catalog) => Ok(Sitemap {
            xml: render_sitemap(urls, Some(&catalog), now)?,
            complete: true,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "sitemap fetch failed, serving home-only sitemap");
            Ok(Sitemap {
                xml: render_sitemap(urls, None, now)?,
                complete: false,
            })
        }
    }
}
