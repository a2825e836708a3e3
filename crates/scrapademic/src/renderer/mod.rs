//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use chromium::ChromiumRenderer;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// How a rendering session should be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Mask the usual headless-automation fingerprints.
    pub stealth: bool,
}

/// A browser engine that can open rendering sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new isolated rendering session.
    async fn new_context(&self, options: &SessionOptions) -> Result<Box<dyn RenderContext>>;
    /// Number of sessions opened and not yet closed.
    fn active_contexts(&self) -> usize;
}

/// A single rendering session.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for the page to settle, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult>;
    /// Wait until at least one element matches `selector`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;
    /// Close this session and release the browser behind it.
    async fn close(self: Box<Self>) -> Result<()>;
}
