//! "Show more" pagination on the profile page.
//!
//! The profile initially renders one batch of rows. Each click on the
//! `#gsc_bpf_more` button appends the next batch; once the last batch is
//! loaded the page disables the button. We keep clicking until the probe
//! says the button is gone, disabled, or hidden.

use std::time::Duration;

use async_trait::async_trait;

use crate::renderer::RenderContext;
use crate::types::{ScrapeError, ScrapeResult};

/// Selector of the "show more" button.
pub const LOAD_MORE: &str = "#gsc_bpf_more";

/// Returns `true` when the button can be clicked, `false` when it is disabled
/// or hidden, and `null` when it is not in the document.
const PROBE_SCRIPT: &str = r#"(() => {
    const btn = document.querySelector('#gsc_bpf_more');
    if (!btn) return null;
    return !btn.disabled && btn.offsetParent !== null;
})()"#;

/// How to pause between a click and the next probe.
#[async_trait]
pub trait Settle: Send + Sync {
    async fn wait(&self, period: Duration);
}

/// Sleeps for the full period.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay;

#[async_trait]
impl Settle for FixedDelay {
    async fn wait(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Settle for NoDelay {
    async fn wait(&self, _period: Duration) {}
}

/// Ask the page whether the load-more control is usable.
///
/// `None` means the control is absent or the probe itself failed; callers
/// treat that exactly like `Some(false)`.
pub async fn probe_load_more(ctx: &dyn RenderContext) -> Option<bool> {
    match ctx.execute_js(PROBE_SCRIPT).await {
        Ok(value) => value.as_bool(),
        Err(e) => {
            tracing::debug!("load-more probe failed: {e:#}");
            None
        }
    }
}

/// Click "show more" until the page stops offering it. Returns the number of
/// clicks performed.
///
/// There is no click cap: termination depends on the page disabling or
/// hiding the control after the final batch.
pub async fn expand_all(
    ctx: &dyn RenderContext,
    settle: &dyn Settle,
    interval: Duration,
) -> ScrapeResult<usize> {
    let mut clicks = 0;

    while probe_load_more(ctx).await == Some(true) {
        ctx.click(LOAD_MORE)
            .await
            .map_err(|e| ScrapeError::Navigation(format!("{e:#}")))?;
        clicks += 1;
        tracing::debug!(clicks, "requested next batch of publications");

        settle.wait(interval).await;
    }

    tracing::info!(clicks, "pagination exhausted");
    Ok(clicks)
}
