//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all, via [`Config::minimal`]) yields a working configuration that reads
//! from the public content endpoint.
//!
//! ```toml
//! [content]
//! endpoint = "https://private-d21258-herbertayala.apiary-mock.com/pulgarpedia-content"
//! timeout_secs = 10
//! integrity = "strict"        # or "lenient"
//!
//! [catalog]
//! page_size = 12
//! scroll_delay_ms = 300
//! related_limit = 4
//! recommendations = 8
//!
//! [site]
//! name = "Pulgarpedia"
//! base_url = "https://pulgarpedia.com"
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! ```

use anyhow::{Context, Result};
use pulgarpedia_core::IntegrityMode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub integrity: IntegrityMode,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            integrity: IntegrityMode::default(),
        }
    }
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_endpoint() -> String {
    "https://private-d21258-herbertayala.apiary-mock.com/pulgarpedia-content".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
    #[serde(default = "default_recommendations")]
    pub recommendations: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            scroll_delay_ms: default_scroll_delay_ms(),
            related_limit: default_related_limit(),
            recommendations: default_recommendations(),
        }
    }
}

impl CatalogConfig {
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

fn default_page_size() -> usize {
    pulgarpedia_core::pagination::DEFAULT_PAGE_SIZE
}
fn default_scroll_delay_ms() -> u64 {
    300
}
fn default_related_limit() -> usize {
    pulgarpedia_core::related::DEFAULT_RELATED_LIMIT
}
fn default_recommendations() -> usize {
    pulgarpedia_core::related::DEFAULT_RECOMMENDATION_COUNT
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
        }
    }
}

fn default_site_name() -> String {
    "Pulgarpedia".to_string()
}
fn default_base_url() -> String {
    "https://pulgarpedia.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Config {
    /// All defaults. Used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.timeout_secs == 0 {
            anyhow::bail!("content.timeout_secs must be > 0");
        }

        let endpoint = url::Url::parse(&self.content.endpoint)
            .with_context(|| format!("content.endpoint is not a URL: {}", self.content.endpoint))?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!(
                "content.endpoint must be http or https, got '{}'",
                other
            ),
        }

        if self.catalog.page_size == 0 {
            anyhow::bail!("catalog.page_size must be >= 1");
        }

        crate::links::SiteUrls::new(&self.site.base_url)
            .with_context(|| format!("site.base_url is not usable: {}", self.site.base_url))?;

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
