//! Core data types for scraped publications and retrieval settings.

use serde::{Deserialize, Serialize};

/// Placeholder title for a row whose title could not be read.
pub const UNTITLED: &str = "Untitled";
/// Placeholder author list entry.
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Trailing entry that replaces a truncated author list.
pub const AND_OTHERS: &str = "and others";
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";
pub const UNKNOWN_YEAR: &str = "Unknown Year";

/// Default number of records kept when only the first batch is scraped.
pub const DEFAULT_LIMIT: usize = 6;

/// One publication row of a profile, with every field populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    /// Kept as text: the page sometimes shows placeholders instead of a number.
    pub year: String,
    pub cited_by: u32,
}

impl Default for PublicationRecord {
    fn default() -> Self {
        Self {
            title: UNTITLED.to_string(),
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            journal: UNKNOWN_JOURNAL.to_string(),
            year: UNKNOWN_YEAR.to_string(),
            cited_by: 0,
        }
    }
}

/// Ordering the profile page applies before rows are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Citations,
    Year,
}

/// What to retrieve from a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    pub sort_by: SortBy,
    /// Keep clicking "show more" until the page runs out of rows.
    pub all_publications: bool,
    /// Cap on the result count when `all_publications` is false.
    pub limit: usize,
    pub use_stealth: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Citations,
            all_publications: true,
            limit: DEFAULT_LIMIT,
            use_stealth: true,
        }
    }
}

impl RetrievalOptions {
    /// Only the rows visible on first load, truncated to `limit`.
    pub fn recent(limit: usize) -> Self {
        Self {
            all_publications: false,
            limit,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ScrapeResult<()> {
        if self.limit == 0 {
            return Err(ScrapeError::InvalidInput(
                "limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur while scraping or serializing a profile.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
