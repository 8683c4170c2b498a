//! Catalog statistics.
//!
//! Fetches the catalog and prints a summary: totals and a per-category
//! breakdown. Used by `pulgarpedia stats` to confirm the content endpoint
//! is serving what the site expects.

use anyhow::Result;
use pulgarpedia_core::stats::{catalog_stats, CatalogStats};

use crate::client::load_catalog;
use crate::config::Config;

/// Run the stats command: load the catalog and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let stats = catalog_stats(&catalog);
    print!("{}", format_stats(&config.content.endpoint, &stats));
    Ok(())
}

fn format_stats(endpoint: &str, stats: &CatalogStats) -> String {
    let mut out = String::new();
    out.push_str("Pulgarpedia — Catalog Stats\n");
    out.push_str("===========================\n\n");
    out.push_str(&format!("  Endpoint:    {}\n\n", endpoint));
    out.push_str(&format!("  Categories:  {}\n", stats.total_categories));
    out.push_str(&format!("  Places:      {}\n", stats.total_places));

    if !stats.by_category.is_empty() {
        out.push_str("\n  By category:\n");
        out.push_str(&format!("  {:<24} {:>6}\n", "CATEGORY", "PLACES"));
        out.push_str(&format!("  {:<24} {:>6}\n", "--------", "------"));
        for row in &stats.by_category {
            out.push_str(&format!("  {:<24} {:>6}\n", row.id, row.count));
        }
    }
    if stats.uncategorized > 0 {
        out.push_str(&format!("\n  Uncategorized: {}\n", stats.uncategorized));
    }
    out
}
