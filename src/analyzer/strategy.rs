use super::content_type::{ContentType, ContentTypeReport};
use super::pagination::{PaginationMethods, PaginationType};
use super::signals::StructuralSignals;
use crate::config::PaginationKind;
use crate::extractors::ExtractionPlan;
use serde::Serialize;

/// Advisory output of the analyzer, consumed by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRecommendation {
    pub extractor_priority: Vec<String>,
    pub skip_extractors: Vec<String>,
    pub pagination_strategy: Option<PaginationKind>,
    pub click_selector: Option<String>,
    pub max_scrolls: usize,
    pub scroll_delay_ms: u64,
    /// Set when the page was judged simple enough to skip pagination
    pub simple_page: bool,
}

impl Default for StrategyRecommendation {
    fn default() -> Self {
        Self {
            extractor_priority: Vec::new(),
            skip_extractors: Vec::new(),
            pagination_strategy: None,
            click_selector: None,
            max_scrolls: 20,
            scroll_delay_ms: 1000,
            simple_page: false,
        }
    }
}

impl StrategyRecommendation {
    /// The extraction plan this recommendation implies
    pub fn extraction_plan(&self, early_exit_threshold: usize) -> ExtractionPlan {
        ExtractionPlan {
            priority: self.extractor_priority.clone(),
            skip: self.skip_extractors.clone(),
            early_exit_threshold,
        }
    }
}

/// A page small enough that one extraction pass sees everything
pub fn is_simple_page(signals: &StructuralSignals) -> bool {
    signals.element_count < 100
        && signals.heading_count < 5
        && signals.link_count < 20
        && signals.text_length < 2000
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Picks extractors, a pagination strategy and scroll budget for a page
pub fn determine_optimal_strategy(
    signals: &StructuralSignals,
    content: &ContentTypeReport,
    pagination: &PaginationMethods,
) -> StrategyRecommendation {
    if is_simple_page(signals) {
        ::log::debug!(
            "Simple page ({} elements, {} headings, {} links), no pagination",
            signals.element_count,
            signals.heading_count,
            signals.link_count
        );
        return StrategyRecommendation {
            extractor_priority: names(&["article", "main_content", "basic"]),
            skip_extractors: names(&[
                "multi_column",
                "largest_block",
                "text_density",
                "single_column",
            ]),
            pagination_strategy: None,
            click_selector: None,
            max_scrolls: 0,
            scroll_delay_ms: 0,
            simple_page: true,
        };
    }

    let (priority, skip, max_scrolls, scroll_delay_ms): (&[&str], &[&str], usize, u64) =
        match content.primary {
            Some(ContentType::Article) => (
                &["structured_data", "article", "main_content", "semantic"],
                &["product"],
                5,
                1000,
            ),
            Some(ContentType::Product) => (
                &["structured_data", "product", "main_content"],
                &["documentation"],
                10,
                1500,
            ),
            Some(ContentType::Listing) => (
                &["main_content", "sections", "multi_column"],
                &["documentation"],
                30,
                2000,
            ),
            Some(ContentType::Documentation) => (
                &["documentation", "main_content", "semantic"],
                &["product"],
                3,
                500,
            ),
            Some(ContentType::Recipe) => (
                &["structured_data", "article"],
                &["product", "documentation"],
                5,
                1000,
            ),
            None => (&[], &[], 20, 1000),
        };

    let (pagination_strategy, click_selector) = match pagination.primary {
        PaginationType::Url if pagination.url_parameter.is_some() => (Some(PaginationKind::Parameter), None),
        PaginationType::Url | PaginationType::NextLink | PaginationType::Numbered => {
            (Some(PaginationKind::Url), None)
        }
        PaginationType::LoadMore => (
            Some(PaginationKind::Click),
            pagination.load_more_selector.clone(),
        ),
        PaginationType::TextLink => (
            Some(PaginationKind::Click),
            pagination.text_link_selector.clone(),
        ),
        PaginationType::Infinite => (Some(PaginationKind::Infinite), None),
        PaginationType::None => (None, None),
    };

    StrategyRecommendation {
        extractor_priority: names(priority),
        skip_extractors: names(skip),
        pagination_strategy,
        click_selector,
        max_scrolls,
        scroll_delay_ms,
        simple_page: false,
    }
}
