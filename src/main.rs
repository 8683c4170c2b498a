//! # Pulgarpedia CLI (`pulgarpedia`)
//!
//! Serves the site and offers a few commands for inspecting the content
//! catalog from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! pulgarpedia --config ./config/pulgarpedia.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pulgarpedia serve` | Start the HTTP server |
//! | `pulgarpedia search "<query>"` | Search places |
//! | `pulgarpedia get <id>` | Show one place |
//! | `pulgarpedia stats` | Catalog totals per category |
//! | `pulgarpedia check` | Fetch the catalog and report integrity issues |
//! | `pulgarpedia sitemap` | Print the sitemap XML |
//!
//! ## Examples
//!
//! ```bash
//! # Accent-insensitive search within a category
//! pulgarpedia search volcan --category volcanoes
//!
//! # Second page of all places
//! pulgarpedia search --page 2
//!
//! # Serve on the configured address
//! pulgarpedia serve
//! ```

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use pulgarpedia::client::HttpContentSource;
use pulgarpedia::config::{self, Config};
use pulgarpedia::links::SiteUrls;
use pulgarpedia::{check, get, logging, search, server, sitemap, stats};

/// Pulgarpedia: a tourism encyclopedia of El Salvador.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/pulgarpedia.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "pulgarpedia",
    about = "Pulgarpedia — a tourism encyclopedia of El Salvador",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/pulgarpedia.toml")]
    config: PathBuf,

    /// Verbose logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve,

    /// Search places by text and category.
    ///
    /// Matching ignores case and accents and looks at the title, subtitle,
    /// description, and address of each place.
    Search {
        /// Text to search for. Omit to list everything.
        query: Option<String>,

        /// Only places in this category id.
        #[arg(long)]
        category: Option<String>,

        /// Show the first N pages of results.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show one place by id.
    Get {
        /// The place id (e.g. `el-tunco`).
        id: String,
    },

    /// Show catalog totals per category.
    Stats,

    /// Fetch the catalog and report integrity issues.
    Check,

    /// Print the sitemap XML to stdout.
    Sitemap,

    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "pulgarpedia",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    logging::init_logging(cli.verbose)?;
    let cfg = load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search {
            query,
            category,
            page,
        } => {
            search::run_search(&cfg, query, category, page).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Check => {
            check::run_check(&cfg).await?;
        }
        Commands::Sitemap => {
            let urls = SiteUrls::new(&cfg.site.base_url)?;
            let source = HttpContentSource::new(&cfg.content)?;
            let map = sitemap::generate_sitemap(&urls, &source, cfg.content.integrity).await?;
            print!("{}", map.xml);
            if !map.complete {
                eprintln!("warning: catalog unavailable, sitemap lists the home page only");
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
