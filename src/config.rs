use crate::catalog::CLICK_PAGINATION_SELECTORS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Pagination strategy a caller can force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationKind {
    /// Scroll-driven lazy loading
    Infinite,
    /// Click a "next" / "load more" control
    Click,
    /// Follow `rel=next` links or a `/page/{num}` pattern
    Url,
    /// Increment a query parameter
    Parameter,
}

/// Configuration for one scrape session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Scroll budget per scroll pass
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Delay after each scroll step, in milliseconds
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,

    /// Force a pagination strategy instead of auto-selecting one
    #[serde(default)]
    pub pagination_strategy: Option<PaginationKind>,

    /// Selector for the click strategy
    #[serde(default)]
    pub click_selector: Option<String>,

    /// Maximum page number for URL based pagination
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Query parameter incremented by parameter pagination
    #[serde(default = "default_page_parameter")]
    pub page_parameter: String,

    /// Selector that must match on a freshly loaded page
    #[serde(default)]
    pub content_verification_selector: Option<String>,

    /// Selector awaited before analysis starts
    #[serde(default)]
    pub wait_for_selector: Option<String>,

    /// Path pattern for URL pagination, e.g. `/page/{num}`
    #[serde(default)]
    pub url_pattern: Option<String>,

    /// Click budget per selector
    #[serde(default = "default_max_clicks")]
    pub max_clicks: usize,

    /// Delay after each click, in milliseconds
    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: u64,

    /// Run every fallback stage instead of stopping at the first productive one
    #[serde(default = "default_brute_force")]
    pub brute_force: bool,

    /// Navigation timeout in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Selector wait timeout in seconds
    #[serde(default = "default_selector_timeout_secs")]
    pub selector_timeout_secs: u64,

    /// Scroll back to where the page was after the infinite-scroll probe
    #[serde(default = "default_restore_scroll")]
    pub restore_scroll_after_analysis: bool,

    /// New fragments from the priority extractors that end a pass early
    #[serde(default = "default_early_exit_threshold")]
    pub early_exit_threshold: usize,

    /// Selectors tried by the click fallback stage
    #[serde(default = "default_click_selectors")]
    pub click_selectors: Vec<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

/// Default value for max_scrolls
fn default_max_scrolls() -> usize {
    20
}

/// Default value for scroll_delay_ms
fn default_scroll_delay_ms() -> u64 {
    1000
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    10
}

/// Default page parameter
fn default_page_parameter() -> String {
    "page".to_string()
}

/// Default value for max_clicks
fn default_max_clicks() -> usize {
    10
}

/// Default value for click_delay_ms
fn default_click_delay_ms() -> u64 {
    1500
}

fn default_brute_force() -> bool {
    true
}

fn default_navigation_timeout_secs() -> u64 {
    90
}

fn default_selector_timeout_secs() -> u64 {
    30
}

fn default_restore_scroll() -> bool {
    true
}

fn default_early_exit_threshold() -> usize {
    20
}

/// Default click catalog
fn default_click_selectors() -> Vec<String> {
    CLICK_PAGINATION_SELECTORS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_scrolls: default_max_scrolls(),
            scroll_delay_ms: default_scroll_delay_ms(),
            pagination_strategy: None,
            click_selector: None,
            max_pages: default_max_pages(),
            page_parameter: default_page_parameter(),
            content_verification_selector: None,
            wait_for_selector: None,
            url_pattern: None,
            max_clicks: default_max_clicks(),
            click_delay_ms: default_click_delay_ms(),
            brute_force: default_brute_force(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            selector_timeout_secs: default_selector_timeout_secs(),
            restore_scroll_after_analysis: default_restore_scroll(),
            early_exit_threshold: default_early_exit_threshold(),
            click_selectors: default_click_selectors(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a strategy unusable
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.page_parameter.trim().is_empty() {
            return Err(crate::Error::Config("page_parameter must not be empty".into()));
        }
        if let Some(pattern) = &self.url_pattern {
            if !pattern.contains("{num}") {
                return Err(crate::Error::Config(format!(
                    "url_pattern '{}' has no {{num}} placeholder",
                    pattern
                )));
            }
        }
        Ok(())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }
}
