// Re-export modules
pub mod analyzer;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod orchestrator;
pub mod pagination;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{PaginationKind, ScrapeConfig};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, ScrapeOutcome};
pub use results::PageDocument;

use browser::webdriver::{self, WebDriverPage};
use browser::Page;

/// Main builder for one scrape of a single URL
pub struct Unfold {
    url: String,
    config: ScrapeConfig,
}

impl Unfold {
    /// Create a new builder for the given URL with the default configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            config: ScrapeConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ScrapeConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let config = ScrapeConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(
        self,
        config_str: &str,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let config = ScrapeConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Set the scroll budget per scroll pass
    pub fn with_max_scrolls(mut self, max_scrolls: usize) -> Self {
        self.config.max_scrolls = max_scrolls;
        self
    }

    /// Set the highest page number URL pagination may reach
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Force a pagination strategy instead of letting the analyzer choose
    pub fn with_pagination(mut self, kind: PaginationKind) -> Self {
        self.config.pagination_strategy = Some(kind);
        self
    }

    /// Stop the fallback pipeline at the first stage that finds content
    pub fn prioritized(mut self) -> Self {
        self.config.brute_force = false;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Open the page in a WebDriver session and run the scrape
    pub async fn run(mut self) -> std::result::Result<ScrapeOutcome, Box<dyn std::error::Error>> {
        self.config.validate()?;

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.config.webdriver_url = webdriver_url;
            }
        }

        let client = webdriver::connect(&self.config.webdriver_url).await?;
        let page = WebDriverPage::new(client, self.config.navigation_timeout());

        let outcome = match page.goto(&self.url).await {
            Ok(()) => {
                let mut orchestrator = Orchestrator::new(self.config);
                Ok(orchestrator.run(&page).await)
            }
            Err(e) => Err(e),
        };

        if let Err(e) = page.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        Ok(outcome?)
    }
}
