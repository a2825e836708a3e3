//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use scrapademic::{
    OutputFormat, RetrievalOptions, ScrapeConfig, ScrapeError, SortBy, DEFAULT_LIMIT,
};

#[derive(Parser, Debug)]
#[command(
    name = "scrapademic",
    about = "Scrape Google Scholar profiles from the command line",
    version
)]
pub struct Cli {
    /// Google Scholar user ID (the `user=` value of a profile URL).
    #[arg(required_unless_present = "completions")]
    pub user_id: Option<String>,

    /// Sort by year instead of citations.
    #[arg(short, long)]
    pub year: bool,

    /// Scrape all publications (default).
    #[arg(short, long)]
    pub all: bool,

    /// Scrape only the publications shown on first load.
    #[arg(short, long)]
    pub recent: bool,

    /// Number of results when using --recent.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Disable stealth mode.
    #[arg(long)]
    pub no_stealth: bool,

    /// Output format (text, json, csv, sql, summary).
    #[arg(short, long, default_value = "json", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Write to FILE instead of stdout. Without FILE, writes scholar_output.<ext>.
    #[arg(short, long, value_name = "FILE", num_args = 0..=1)]
    pub output: Option<Option<PathBuf>>,

    /// Path to the Chromium executable.
    /// Also reads from SCRAPADEMIC_CHROMIUM_PATH env var.
    #[arg(long, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse().map_err(|e: ScrapeError| e.to_string())
}

impl Cli {
    /// `--recent` wins over `--all` when both are given.
    pub fn retrieval_options(&self) -> RetrievalOptions {
        RetrievalOptions {
            sort_by: if self.year {
                SortBy::Year
            } else {
                SortBy::Citations
            },
            all_publications: !self.recent,
            limit: self.limit.map_or(DEFAULT_LIMIT, |l| l as usize),
            use_stealth: !self.no_stealth,
        }
    }

    /// Environment configuration with `--chromium` applied on top.
    pub fn scrape_config(&self) -> ScrapeConfig {
        let mut config = ScrapeConfig::from_env();
        if let Some(path) = &self.chromium {
            config.chromium_path = Some(path.clone());
        }
        config
    }

    /// Destination file, if output should not go to stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.output {
            None => None,
            Some(Some(path)) => Some(path.clone()),
            Some(None) => Some(PathBuf::from(self.format.default_file_name())),
        }
    }
}
