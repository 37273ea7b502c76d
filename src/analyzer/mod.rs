//! One-shot structural analysis of a live page.
//!
//! The analyzer looks at the page once, before extraction starts, and
//! produces signals, a content-type classification, the pagination methods
//! it can see and a [`StrategyRecommendation`] for the orchestrator.
//!
//! The infinite-scroll probe moves the page to 40% of its height. With
//! `restore_scroll` set (the default) the original position is restored
//! afterwards; otherwise the page is left where the probe stopped.

pub mod content_type;
pub mod infinite_scroll;
pub mod pagination;
pub mod signals;
pub mod strategy;

use crate::browser::Page;
use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::extractors::Dom;
use serde::Serialize;

pub use content_type::{ContentType, ContentTypeReport};
pub use infinite_scroll::InfiniteScrollReport;
pub use pagination::{PaginationMethods, PaginationType};
pub use signals::StructuralSignals;
pub use strategy::StrategyRecommendation;

/// Everything the analyzer learned about a page
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub structure: Option<StructuralSignals>,
    pub content_type: Option<ContentTypeReport>,
    pub pagination: Option<PaginationMethods>,
    pub infinite_scroll: Option<InfiniteScrollReport>,
    pub recommendation: StrategyRecommendation,
    /// The failure that cut the analysis short, if any
    pub error: Option<String>,
    pub partial_results: bool,
}

pub struct StructureAnalyzer {
    settle_delay_ms: u64,
    restore_scroll: bool,
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureAnalyzer {
    pub fn new() -> Self {
        Self {
            settle_delay_ms: 1000,
            restore_scroll: true,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new().with_restore_scroll(config.restore_scroll_after_analysis)
    }

    /// Delay after each probing scroll
    pub fn with_settle_delay(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    pub fn with_restore_scroll(mut self, restore: bool) -> Self {
        self.restore_scroll = restore;
        self
    }

    /// Analyzes the page. Never fails: an evaluation error ends the analysis
    /// and the report carries what was computed so far.
    pub async fn analyze(&self, page: &dyn Page) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        if let Err(e) = self.run(page, &mut report).await {
            ::log::warn!("Structure analysis incomplete: {}", e);
            report.error = Some(e.to_string());
            report.partial_results = true;
        }

        report
    }

    async fn run(&self, page: &dyn Page, report: &mut AnalysisReport) -> Result<()> {
        report.url = page.url().await?;
        let html = page.html().await?;

        let (mut structure, content, mut pagination) = {
            let dom = Dom::parse(&html, &report.url);
            (
                signals::structural_signals(&dom),
                content_type::detect_content_type(&dom),
                pagination::detect_pagination_methods(&dom, &report.url),
            )
        };

        structure.image_area_percent = signals::image_area_percent(page).await;

        ::log::info!(
            "Page {}: {} elements, {} headings, {} links, primary type {}",
            report.url,
            structure.element_count,
            structure.heading_count,
            structure.link_count,
            content
                .primary
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        report.structure = Some(structure.clone());
        report.content_type = Some(content.clone());
        report.pagination = Some(pagination.clone());
        report.recommendation = strategy::determine_optimal_strategy(&structure, &content, &pagination);

        let original = page.scroll_metrics().await?;
        let probe = infinite_scroll::detect_infinite_scroll(page, self.settle_delay_ms).await;

        if self.restore_scroll {
            if let Err(e) = page.scroll_to(original.scroll_x, original.scroll_y).await {
                ::log::debug!("Could not restore scroll position: {}", e);
            }
        }

        let probe = probe?;
        pagination.set_infinite_scroll(probe.detected);
        report.infinite_scroll = Some(probe);
        report.pagination = Some(pagination.clone());
        report.recommendation = strategy::determine_optimal_strategy(&structure, &content, &pagination);

        ::log::info!(
            "Pagination {:?}, recommended strategy {:?}, {} scrolls",
            pagination.primary,
            report.recommendation.pagination_strategy,
            report.recommendation.max_scrolls
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::MockPage;
    use crate::browser::scripts;
    use crate::config::PaginationKind;
    use serde_json::json;

    fn busy_listing() -> String {
        let cards: String = (0..40)
            .map(|i| format!("<div class='card'><h3>Item {}</h3><a href='/i/{}'>Open item</a><p>{}</p></div>", i, i, "text ".repeat(20)))
            .collect();
        format!("<html><body><main>{}</main></body></html>", cards)
    }

    #[tokio::test]
    async fn test_article_scenario() {
        let page = MockPage::new("https://example.com/a", "<article><p>A</p><p>B</p></article>");
        let report = StructureAnalyzer::new().with_settle_delay(0).analyze(&page).await;
        assert!(!report.partial_results);
        assert_eq!(report.content_type.unwrap().primary, Some(ContentType::Article));
        assert!(report.recommendation.simple_page);
        assert_eq!(report.recommendation.pagination_strategy, None);
    }

    #[tokio::test]
    async fn test_scroll_position_is_restored() {
        let page = MockPage::new("https://example.com/list", &busy_listing()).with_height(8000.0);
        StructureAnalyzer::new().with_settle_delay(0).analyze(&page).await;
        assert_eq!(page.scroll_y(), 0.0);

        let page = MockPage::new("https://example.com/list", &busy_listing()).with_height(8000.0);
        StructureAnalyzer::new()
            .with_settle_delay(0)
            .with_restore_scroll(false)
            .analyze(&page)
            .await;
        assert_eq!(page.scroll_y(), 3200.0);
    }

    #[tokio::test]
    async fn test_infinite_scroll_feeds_recommendation() {
        let page = MockPage::new("https://example.com/category/feed", &busy_listing())
            .with_growth(500.0, 20_000.0)
            .with_response(
                scripts::INFINITE_SCROLL_PROBE,
                json!({"loadingIndicators": true, "lazyImages": 0, "sentinels": false, "intersectionObserver": false}),
            );
        let report = StructureAnalyzer::new().with_settle_delay(0).analyze(&page).await;
        assert!(report.infinite_scroll.unwrap().detected);
        assert_eq!(report.pagination.unwrap().primary, PaginationType::Infinite);
        assert_eq!(
            report.recommendation.pagination_strategy,
            Some(PaginationKind::Infinite)
        );
        assert_eq!(report.recommendation.max_scrolls, 30);
    }

    #[tokio::test]
    async fn test_failure_yields_partial_results() {
        let page = MockPage::new("https://example.com", "<p>x</p>").with_failing_html();
        let report = StructureAnalyzer::new().with_settle_delay(0).analyze(&page).await;
        assert!(report.partial_results);
        assert!(report.error.is_some());
        assert_eq!(report.url, "https://example.com");
        assert!(report.structure.is_none());
    }
}
