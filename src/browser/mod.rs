//! The live page handle the core drives.
//!
//! Everything above this module talks to a [`Page`]; the only real
//! implementation is [`webdriver::WebDriverPage`]. A handle is driven
//! strictly sequentially, so implementations need no locking of their own.

pub mod scripts;
pub mod webdriver;

#[cfg(test)]
pub mod mock;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser window dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Scroll position and document extent, as reported by the page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub scroll_height: f64,
    pub scroll_width: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

/// Keys the pagination engine dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    PageDown,
    End,
    Home,
}

/// A live, already-navigated page.
#[async_trait]
pub trait Page: Send + Sync {
    /// Current URL of the page
    async fn url(&self) -> Result<String>;

    /// Serialized snapshot of the live DOM
    async fn html(&self) -> Result<String>;

    /// Runs a script in the page and returns its JSON result.
    ///
    /// Scripts are function bodies: they `return` their value and read
    /// parameters from `arguments`.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Navigates to a URL, bounded by the navigation timeout
    async fn goto(&self, url: &str) -> Result<()>;

    /// Waits for a selector to appear; `Ok(false)` if the wait timed out
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Waits until the page has finished loading
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;

    async fn scroll_metrics(&self) -> Result<ScrollMetrics>;

    async fn scroll_to(&self, x: f64, y: f64) -> Result<()>;

    /// Browser window size; the value `set_viewport` restores exactly
    async fn viewport(&self) -> Result<Viewport>;

    /// Resizes the browser window
    async fn set_viewport(&self, viewport: Viewport) -> Result<()>;

    /// Scrolls the first match to the middle of the viewport; `Ok(false)`
    /// when nothing matches
    async fn scroll_into_view(&self, selector: &str) -> Result<bool>;

    /// Non-zero box inside the current viewport and not hidden by CSS.
    /// Does not scroll.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Number of elements matching a selector
    async fn count(&self, selector: &str) -> Result<usize>;

    async fn press_key(&self, key: Key) -> Result<()>;

    /// Dispatches synthetic hover events across the page and returns how
    /// many elements received them
    async fn dispatch_hover(&self) -> Result<usize>;
}
