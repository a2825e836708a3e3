//! Retrieval orchestrator: one rendering session per profile scrape.
//!
//! Opens a session, loads the profile, optionally pages through every batch,
//! snapshots the rows, and always closes the session before returning.

use std::sync::Arc;

use url::Url;

use crate::config::ScrapeConfig;
use crate::normalize::{normalize_row, RowFragments};
use crate::paginate::{expand_all, FixedDelay, Settle};
use crate::renderer::{ChromiumRenderer, RenderContext, Renderer, SessionOptions};
use crate::types::{PublicationRecord, RetrievalOptions, ScrapeError, ScrapeResult, SortBy};

/// Selector of one publication row.
pub const ROW: &str = "tr.gsc_a_tr";

/// Serializes every row currently in the table, in display order.
const SNAPSHOT_SCRIPT: &str =
    "Array.from(document.querySelectorAll('tr.gsc_a_tr'), (row) => row.outerHTML)";

/// Build the profile URL for `profile_id` under `base_url`.
pub fn profile_url(base_url: &str, profile_id: &str, sort_by: SortBy) -> ScrapeResult<String> {
    let profile_id = profile_id.trim();
    if profile_id.is_empty() {
        return Err(ScrapeError::InvalidInput(
            "profile ID must not be empty".to_string(),
        ));
    }

    let base = format!("{}/citations", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .map_err(|e| ScrapeError::InvalidInput(format!("bad base URL {base_url:?}: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("hl", "en").append_pair("user", profile_id);
        if sort_by == SortBy::Year {
            query.append_pair("sortby", "pubdate");
        }
    }

    Ok(url.into())
}

/// Scrapes Scholar profiles through a [`Renderer`].
pub struct Scraper {
    renderer: Arc<dyn Renderer>,
    settle: Arc<dyn Settle>,
    config: ScrapeConfig,
}

impl Scraper {
    pub fn new(renderer: Arc<dyn Renderer>, config: ScrapeConfig) -> Self {
        Self {
            renderer,
            settle: Arc::new(FixedDelay),
            config,
        }
    }

    /// Scraper backed by a headless Chromium per call.
    pub fn chromium(config: ScrapeConfig) -> Self {
        let renderer = Arc::new(ChromiumRenderer::new(&config));
        Self::new(renderer, config)
    }

    /// Replace the pause used after each "show more" click.
    pub fn with_settle(mut self, settle: Arc<dyn Settle>) -> Self {
        self.settle = settle;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Retrieve the publications of one profile.
    ///
    /// Results keep the page's own order (`options.sort_by` is applied by
    /// the page, not here). When `all_publications` is false only the first
    /// loaded batch is read and then cut to `options.limit`.
    pub async fn retrieve(
        &self,
        profile_id: &str,
        options: &RetrievalOptions,
    ) -> ScrapeResult<Vec<PublicationRecord>> {
        options.validate()?;
        let url = profile_url(&self.config.base_url, profile_id, options.sort_by)?;
        tracing::info!(%url, all = options.all_publications, "scraping profile");

        let session = SessionOptions {
            stealth: options.use_stealth,
        };
        let mut ctx = self
            .renderer
            .new_context(&session)
            .await
            .map_err(|e| ScrapeError::Session(format!("{e:#}")))?;

        let outcome = self.scrape_page(ctx.as_mut(), &url, options).await;

        if let Err(e) = ctx.close().await {
            tracing::warn!("failed to close rendering session: {e:#}");
        }

        let mut records = outcome?;
        if !options.all_publications {
            records.truncate(options.limit);
        }

        tracing::info!(count = records.len(), "publications retrieved");
        Ok(records)
    }

    async fn scrape_page(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
        options: &RetrievalOptions,
    ) -> ScrapeResult<Vec<PublicationRecord>> {
        let nav = ctx
            .navigate(url, self.config.navigation_timeout)
            .await
            .map_err(|e| ScrapeError::Navigation(format!("{e:#}")))?;
        tracing::debug!(final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "profile loaded");

        ctx.wait_for_selector(ROW, self.config.row_timeout)
            .await
            .map_err(|e| {
                ScrapeError::Extraction(format!(
                    "no publications on the profile page; the ID may be invalid or Scholar unreachable ({e:#})"
                ))
            })?;

        if options.all_publications {
            expand_all(&*ctx, self.settle.as_ref(), self.config.settle_interval).await?;
        }

        let rows = snapshot_rows(&*ctx).await?;
        tracing::debug!(rows = rows.len(), "row snapshot taken");

        Ok(rows
            .iter()
            .map(|html| normalize_row(&RowFragments::from_row_html(html)))
            .collect())
    }
}

/// Outer HTML of every publication row currently rendered.
pub async fn snapshot_rows(ctx: &dyn RenderContext) -> ScrapeResult<Vec<String>> {
    let value = ctx
        .execute_js(SNAPSHOT_SCRIPT)
        .await
        .map_err(|e| ScrapeError::Extraction(format!("row snapshot failed: {e:#}")))?;

    serde_json::from_value(value)
        .map_err(|e| ScrapeError::Extraction(format!("unexpected row snapshot: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_by_citations() {
        let url = profile_url("https://scholar.google.com", "qc6CJjYAAAAJ", SortBy::Citations)
            .unwrap();
        assert_eq!(
            url,
            "https://scholar.google.com/citations?hl=en&user=qc6CJjYAAAAJ"
        );
    }

    #[test]
    fn test_profile_url_by_year() {
        let url = profile_url("https://scholar.google.com/", "abc", SortBy::Year).unwrap();
        assert_eq!(
            url,
            "https://scholar.google.com/citations?hl=en&user=abc&sortby=pubdate"
        );
    }

    #[test]
    fn test_profile_url_encodes_id() {
        let url = profile_url("http://localhost:9000", " a b&c ", SortBy::Citations).unwrap();
        assert_eq!(url, "http://localhost:9000/citations?hl=en&user=a+b%26c");
    }

    #[test]
    fn test_profile_url_rejects_empty_id() {
        let err = profile_url("https://scholar.google.com", "   ", SortBy::Citations).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidInput(_)));
    }

    #[test]
    fn test_profile_url_rejects_bad_base() {
        let err = profile_url("not a url", "abc", SortBy::Citations).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidInput(_)));
    }
}
