//! Configuration loading and resolution.
//!
//! Defaults are overridden by `SCRAPADEMIC_*` environment variables, which
//! the CLI in turn overrides with explicit flags.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://scholar.google.com";

/// Runtime knobs for a scrape. None of these change the shape of the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Scholar origin; profile URLs are built relative to it.
    pub base_url: String,
    /// Explicit Chromium executable. Falls back to discovery when unset.
    pub chromium_path: Option<PathBuf>,
    /// Upper bound on starting the browser.
    pub launch_timeout: Duration,
    /// Upper bound on loading the profile page.
    pub navigation_timeout: Duration,
    /// Upper bound on waiting for the first publication row.
    pub row_timeout: Duration,
    /// Pause after each "show more" click so the next batch can render.
    pub settle_interval: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chromium_path: None,
            launch_timeout: Duration::from_secs(60),
            navigation_timeout: Duration::from_secs(60),
            row_timeout: Duration::from_secs(30),
            settle_interval: Duration::from_secs(1),
        }
    }
}

impl ScrapeConfig {
    /// Defaults with any `SCRAPADEMIC_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SCRAPADEMIC_BASE_URL") {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = lookup("SCRAPADEMIC_CHROMIUM_PATH") {
            self.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(d) = lookup("SCRAPADEMIC_NAV_TIMEOUT_MS").and_then(|v| parse_millis(&v)) {
            self.navigation_timeout = d;
        }
        if let Some(d) = lookup("SCRAPADEMIC_ROW_TIMEOUT_MS").and_then(|v| parse_millis(&v)) {
            self.row_timeout = d;
        }
        if let Some(d) = lookup("SCRAPADEMIC_SETTLE_MS").and_then(|v| parse_millis(&v)) {
            self.settle_interval = d;
        }
        self
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!("ignoring non-numeric duration override: {raw:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.base_url, "https://scholar.google.com");
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
        assert_eq!(config.settle_interval, Duration::from_secs(1));
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ScrapeConfig::default().with_overrides(lookup(&[
            ("SCRAPADEMIC_BASE_URL", "http://localhost:8080/"),
            ("SCRAPADEMIC_CHROMIUM_PATH", "/opt/chrome/chrome"),
            ("SCRAPADEMIC_SETTLE_MS", "250"),
            ("SCRAPADEMIC_NAV_TIMEOUT_MS", "5000"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.chromium_path, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(config.settle_interval, Duration::from_millis(250));
        assert_eq!(config.navigation_timeout, Duration::from_secs(5));
        assert_eq!(config.row_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_bad_duration_keeps_default() {
        let config =
            ScrapeConfig::default().with_overrides(lookup(&[("SCRAPADEMIC_ROW_TIMEOUT_MS", "soon")]));
        assert_eq!(config.row_timeout, Duration::from_secs(30));
    }
}
