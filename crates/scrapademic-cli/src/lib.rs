//! Scrapademic CLI — scrape a Google Scholar profile from the command line.

pub mod cli;
pub mod output;

use anyhow::{Context, Result};

use scrapademic::{serialize, Scraper};

pub use cli::Cli;

/// Install the stderr log subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Scrape the requested profile and emit it in the requested format.
pub async fn run(cli: &Cli) -> Result<()> {
    let user_id = cli
        .user_id
        .as_deref()
        .context("a Google Scholar user ID is required")?;

    let scraper = Scraper::chromium(cli.scrape_config());
    let records = scraper.retrieve(user_id, &cli.retrieval_options()).await?;
    let text = serialize(&records, cli.format)?;

    output::emit(&text, cli.output_path().as_deref())
}
