//! Chromium-based renderer using chromiumoxide.
//!
//! Every session launches its own headless browser so that nothing (cookies,
//! cache, stealth patches) leaks between scrapes.

use super::{NavigationResult, RenderContext, Renderer, SessionOptions};
use crate::config::ScrapeConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Poll interval while waiting for a selector to match.
const SELECTOR_POLL: Duration = Duration::from_millis(250);

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path (flag or SCRAPADEMIC_CHROMIUM_PATH)
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. ~/.scrapademic/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".scrapademic/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".scrapademic/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".scrapademic/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".scrapademic/chromium/chrome-linux64/chrome"),
                home.join(".scrapademic/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per rendering session.
pub struct ChromiumRenderer {
    chrome_path: Option<PathBuf>,
    launch_timeout: Duration,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer from the scrape configuration. The browser itself is
    /// only started when a session is opened.
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            chrome_path: config.chromium_path.clone(),
            launch_timeout: config.launch_timeout,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn browser_config(&self, options: &SessionOptions) -> Result<BrowserConfig> {
        let chrome_path = find_chromium(self.chrome_path.as_deref()).context(
            "Chromium not found. Install Chrome/Chromium or set SCRAPADEMIC_CHROMIUM_PATH.",
        )?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if options.stealth {
            builder = builder.arg("--disable-blink-features=AutomationControlled");
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self, options: &SessionOptions) -> Result<Box<dyn RenderContext>> {
        let config = self.browser_config(options)?;

        let (mut browser, mut handler) =
            tokio::time::timeout(self.launch_timeout, Browser::launch(config))
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Chromium did not start within {}ms",
                        self.launch_timeout.as_millis()
                    )
                })?
                .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match open_page(&browser, options).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(stealth = options.stealth, "Chromium session opened");

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            handler_task,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

async fn open_page(browser: &Browser, options: &SessionOptions) -> Result<Page> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to create new page")?;

    if options.stealth {
        page.enable_stealth_mode()
            .await
            .context("failed to enable stealth mode")?;
    }

    Ok(page)
}

/// One headless browser with a single page.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult> {
        let start = Instant::now();

        let page = &self.page;
        let result = tokio::time::timeout(timeout, async {
            page.goto(url).await?;
            // Let the in-page scripts finish their first round of requests
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let found = tokio::time::timeout(timeout, async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL).await;
            }
        })
        .await;

        match found {
            Ok(()) => Ok(()),
            Err(_) => bail!(
                "no element matched `{selector}` within {}ms",
                timeout.as_millis()
            ),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .with_context(|| format!("element `{selector}` not found"))?
            .click()
            .await
            .with_context(|| format!("failed to click `{selector}`"))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.active_count.fetch_sub(1, Ordering::Relaxed);

        let _ = this.page.close().await;
        let mut browser = this.browser;
        let closed = browser.close().await;
        let _ = browser.wait().await;
        this.handler_task.abort();

        closed.context("failed to close Chromium")?;
        tracing::debug!("Chromium session closed");
        Ok(())
    }
}
