use super::PaginationStrategy;
use crate::browser::Page;
use crate::utils::pause;
use async_trait::async_trait;

/// Clicks a "next" or "load more" control until it disappears or the click
/// budget is spent
pub struct ClickStrategy {
    selector: String,
    max_clicks: usize,
    delay_ms: u64,
    clicks: usize,
}

impl ClickStrategy {
    pub fn new(selector: impl Into<String>, max_clicks: usize, delay_ms: u64) -> Self {
        Self {
            selector: selector.into(),
            max_clicks,
            delay_ms,
            clicks: 0,
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    /// Brings the target into view, then checks it is visible there
    async fn target_visible(&self, page: &dyn Page) -> bool {
        if let Err(e) = page.scroll_into_view(&self.selector).await {
            ::log::debug!("Scrolling {} into view failed: {}", self.selector, e);
        }
        match page.is_visible(&self.selector).await {
            Ok(visible) => visible,
            Err(e) => {
                ::log::debug!("Visibility check for {} failed: {}", self.selector, e);
                false
            }
        }
    }
}

#[async_trait]
impl PaginationStrategy for ClickStrategy {
    fn name(&self) -> &'static str {
        "click"
    }

    async fn initialize(&mut self, page: &dyn Page) -> bool {
        self.clicks = 0;
        self.target_visible(page).await
    }

    async fn advance(&mut self, page: &dyn Page) -> bool {
        if self.clicks >= self.max_clicks {
            ::log::debug!("Click budget of {} spent on {}", self.max_clicks, self.selector);
            return false;
        }
        if !self.target_visible(page).await {
            ::log::debug!("Click target {} is gone", self.selector);
            return false;
        }

        if let Err(e) = page.click(&self.selector).await {
            ::log::debug!("Click on {} failed: {}", self.selector, e);
            return false;
        }
        self.clicks += 1;
        ::log::info!("Clicked {} ({}/{})", self.selector, self.clicks, self.max_clicks);

        pause(self.delay_ms).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::MockPage;

    #[tokio::test]
    async fn test_clicks_until_budget() {
        let page = MockPage::new("https://example.com", "<body></body>").with_visible(".more");
        let mut strategy = ClickStrategy::new(".more", 3, 0);
        assert!(strategy.initialize(&page).await);
        while strategy.advance(&page).await {}
        assert_eq!(strategy.clicks(), 3);
        assert_eq!(page.clicks().len(), 3);
    }

    #[tokio::test]
    async fn test_target_is_scrolled_into_view_before_each_check() {
        let page = MockPage::new("https://example.com", "<body></body>").with_visible(".more");
        let mut strategy = ClickStrategy::new(".more", 2, 0);
        strategy.initialize(&page).await;
        while strategy.advance(&page).await {}
        // initialize plus one check per click; the spent budget stops before checking
        assert_eq!(page.scrolled_into_view(), vec![".more"; 3]);
        assert_eq!(page.scroll_calls(), 0);
    }

    #[tokio::test]
    async fn test_invisible_target_stops_immediately() {
        let page = MockPage::new("https://example.com", "<body></body>");
        let mut strategy = ClickStrategy::new(".more", 3, 0);
        assert!(!strategy.initialize(&page).await);
        assert!(!strategy.advance(&page).await);
        assert!(page.clicks().is_empty());
    }
}
