//! Log output setup.
//!
//! Events go to stderr so command output on stdout stays clean. `RUST_LOG`
//! takes precedence over the default filter.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "pulgarpedia=debug,pulgarpedia_core=debug,tower_http=debug,info"
    } else {
        "info"
    }
}

pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;
    Ok(())
}
