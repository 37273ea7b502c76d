use super::PaginationStrategy;
use crate::analyzer::pagination::{detect_pagination_methods, url_path_page};
use crate::browser::Page;
use crate::extractors::Dom;
use crate::utils::{host_of, resolve_url};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Follows `rel=next` links, or fills a `/page/{num}` pattern, page by page
pub struct UrlPathStrategy {
    pattern: Option<String>,
    max_pages: usize,
    idle_timeout: Duration,
    base_url: String,
    current_page: usize,
    visited: HashSet<String>,
}

impl UrlPathStrategy {
    pub fn new(pattern: Option<String>, max_pages: usize, idle_timeout: Duration) -> Self {
        Self {
            pattern,
            max_pages,
            idle_timeout,
            base_url: String::new(),
            current_page: 1,
            visited: HashSet::new(),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// URL of the next page, from the pattern or from the page's next link
    async fn next_url(&self, page: &dyn Page) -> Option<String> {
        if let Some(pattern) = &self.pattern {
            let path = pattern.replace("{num}", &(self.current_page + 1).to_string());
            return resolve_url(&self.base_url, &path);
        }

        let html = page.html().await.ok()?;
        let url = page.url().await.unwrap_or_else(|_| self.base_url.clone());
        detect_pagination_methods(&Dom::parse(&html, &url), &url).next_link
    }
}

#[async_trait]
impl PaginationStrategy for UrlPathStrategy {
    fn name(&self) -> &'static str {
        "url_path"
    }

    async fn initialize(&mut self, page: &dyn Page) -> bool {
        let Ok(url) = page.url().await else {
            return false;
        };
        self.current_page = url_path_page(&url).map(|n| n as usize).unwrap_or(1);
        self.visited.clear();
        self.visited.insert(url.clone());
        self.base_url = url;
        true
    }

    async fn advance(&mut self, page: &dyn Page) -> bool {
        if self.current_page >= self.max_pages {
            ::log::debug!("URL pagination reached page {}", self.current_page);
            return false;
        }

        let Some(next) = self.next_url(page).await else {
            ::log::debug!("No next page link on {}", self.base_url);
            return false;
        };
        if host_of(&next) != host_of(&self.base_url) {
            ::log::debug!("Next link {} leaves the site, stopping", next);
            return false;
        }
        if !self.visited.insert(next.clone()) {
            ::log::debug!("Next link {} was already visited", next);
            return false;
        }

        if let Err(e) = page.goto(&next).await {
            ::log::warn!("URL pagination stopped: {}", e);
            return false;
        }
        if let Err(e) = page.wait_for_network_idle(self.idle_timeout).await {
            ::log::debug!("Network idle wait on {} abandoned: {}", next, e);
        }

        self.current_page += 1;
        ::log::info!("Moved to page {} at {}", self.current_page, next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::MockPage;

    const IDLE: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_follows_next_links_until_missing() {
        let page = MockPage::new(
            "https://blog.example.com/",
            "<a rel='next' href='/page/2'>Older</a>",
        )
        .with_page(
            "https://blog.example.com/page/2",
            "<a rel='next' href='/page/3'>Older</a>",
        )
        .with_page("https://blog.example.com/page/3", "<p>end</p>");

        let mut strategy = UrlPathStrategy::new(None, 10, IDLE);
        assert!(strategy.initialize(&page).await);
        while strategy.advance(&page).await {}

        assert_eq!(
            page.gotos(),
            vec!["https://blog.example.com/page/2", "https://blog.example.com/page/3"]
        );
        assert_eq!(strategy.current_page(), 3);
    }

    #[tokio::test]
    async fn test_pattern_respects_max_pages() {
        let page = MockPage::new("https://example.com/", "<p></p>");
        let mut strategy = UrlPathStrategy::new(Some("/page/{num}".to_string()), 3, IDLE);
        strategy.initialize(&page).await;
        while strategy.advance(&page).await {}
        assert_eq!(
            page.gotos(),
            vec!["https://example.com/page/2", "https://example.com/page/3"]
        );
    }

    #[tokio::test]
    async fn test_navigation_failure_stops() {
        let page = MockPage::new("https://example.com/", "<p></p>")
            .with_failing_navigation("https://example.com/page/2");
        let mut strategy = UrlPathStrategy::new(Some("/page/{num}".to_string()), 10, IDLE);
        strategy.initialize(&page).await;
        assert!(!strategy.advance(&page).await);
        assert_eq!(strategy.current_page(), 1);
    }

    #[tokio::test]
    async fn test_refuses_other_hosts_and_loops() {
        let offsite = MockPage::new(
            "https://example.com/",
            "<a rel='next' href='https://elsewhere.com/2'>Next</a>",
        );
        let mut strategy = UrlPathStrategy::new(None, 10, IDLE);
        strategy.initialize(&offsite).await;
        assert!(!strategy.advance(&offsite).await);

        let looping = MockPage::new("https://example.com/", "<a rel='next' href='/'>Next</a>");
        let mut strategy = UrlPathStrategy::new(None, 10, IDLE);
        strategy.initialize(&looping).await;
        assert!(!strategy.advance(&looping).await);
        assert!(looping.gotos().is_empty());
    }
}
