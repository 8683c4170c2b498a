//! `pulgarpedia check`: fetch the catalog once and report every integrity
//! issue, independent of the configured integrity mode.

use anyhow::Result;
use pulgarpedia_core::validate::check;
use pulgarpedia_core::{ContentSource, IntegrityMode};

use crate::client::HttpContentSource;
use crate::config::Config;

pub async fn run_check(config: &Config) -> Result<()> {
    let source = HttpContentSource::new(&config.content)?;
    println!("Fetching {} ...", source.endpoint());

    let catalog = match source.fetch().await {
        Ok(catalog) => catalog,
        Err(e) => anyhow::bail!("fetch failed: {} ({})", e, e.user_message()),
    };
    println!(
        "  fetched {} categories, {} places",
        catalog.categories.len(),
        catalog.places.len()
    );

    let report = check(&catalog);
    if report.is_clean() {
        println!("  OK: no integrity issues");
        return Ok(());
    }

    println!("  {} integrity issue(s):", report.issues.len());
    for issue in &report.issues {
        println!("    - {}", issue);
    }

    match config.content.integrity {
        IntegrityMode::Strict => {
            anyhow::bail!("catalog would be rejected in strict mode")
        }
        IntegrityMode::Lenient => {
            println!("  (lenient mode: the site will still serve this catalog)");
            Ok(())
        }
    }
}
