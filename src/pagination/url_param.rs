use super::{scroll_until_stable, PaginationStrategy};
use crate::analyzer::pagination::url_parameter;
use crate::browser::Page;
use crate::catalog::PAGINATION_PRONE_KEYWORDS;
use crate::extractors::dom::element_text;
use crate::extractors::Dom;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Consecutive unchanged heights tolerated while exhausting a page
const SCROLL_TOLERANCE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Scroll the current page until it stops growing
    Exhaust,
    /// Load the next page number
    Navigate,
}

/// Walks `?page=N` style pagination, exhausting each page by scrolling
/// before loading the next one
pub struct UrlParameterStrategy {
    parameter: String,
    max_pages: usize,
    verification_selector: Option<String>,
    max_scrolls: usize,
    scroll_delay_ms: u64,
    idle_timeout: Duration,
    base_url: String,
    current_page: usize,
    phase: Phase,
}

impl UrlParameterStrategy {
    pub fn new(parameter: impl Into<String>, max_pages: usize) -> Self {
        Self {
            parameter: parameter.into(),
            max_pages,
            verification_selector: None,
            max_scrolls: 20,
            scroll_delay_ms: 1000,
            idle_timeout: Duration::from_secs(30),
            base_url: String::new(),
            current_page: 1,
            phase: Phase::Exhaust,
        }
    }

    /// Selector that must match at least once on every loaded page
    pub fn with_verification(mut self, selector: Option<String>) -> Self {
        self.verification_selector = selector;
        self
    }

    pub fn with_scrolling(mut self, max_scrolls: usize, delay_ms: u64) -> Self {
        self.max_scrolls = max_scrolls;
        self.scroll_delay_ms = delay_ms;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Whether the live page looks like it paginates through a query parameter
    pub async fn is_applicable(&self, page: &dyn Page) -> bool {
        let Ok(url) = page.url().await else {
            return false;
        };
        let html = page.html().await.unwrap_or_default();
        pagination_prone(&url, &Dom::parse(&html, &url), &self.parameter)
    }

    /// Whether the new page shows content; no selector means it is assumed to
    async fn verify(&self, page: &dyn Page) -> bool {
        let Some(selector) = &self.verification_selector else {
            return true;
        };
        match page.count(selector).await {
            Ok(count) => {
                ::log::debug!("Verification selector {} matched {} elements", selector, count);
                count > 0
            }
            Err(e) => {
                ::log::debug!("Verification selector {} failed: {}", selector, e);
                false
            }
        }
    }
}

/// `base` with `parameter` set to `number`, other query pairs kept
pub fn page_url(base: &str, parameter: &str, number: usize) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != parameter)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(parameter, &number.to_string());
    Some(url.to_string())
}

/// Lowercased words of the host and path, split on `/`, `-`, `_` and `.`
fn url_words(url: &str) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };
    format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path())
        .to_lowercase()
        .split(['/', '-', '_', '.'])
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// A host or path word is one of the pagination-prone keywords
fn has_prone_keyword(url: &str) -> bool {
    url_words(url)
        .iter()
        .any(|word| PAGINATION_PRONE_KEYWORDS.contains(&word.as_str()))
}

/// URL or host keywords, or anchors that look like numbered pages
pub fn pagination_prone(url: &str, dom: &Dom, parameter: &str) -> bool {
    if url_parameter(url).is_some() || has_prone_keyword(url) {
        return true;
    }

    let marker = format!("{}=", parameter);
    dom.select("a[href]")
        .map(|anchors| {
            anchors.into_iter().any(|a| {
                let href = a.value().attr("href").unwrap_or_default();
                let text = element_text(a);
                href.contains(&marker)
                    || href.contains("/page/")
                    || (!text.is_empty()
                        && text.len() <= 3
                        && text.chars().all(|c| c.is_ascii_digit())
                        && text != "1")
            })
        })
        .unwrap_or(false)
}

#[async_trait]
impl PaginationStrategy for UrlParameterStrategy {
    fn name(&self) -> &'static str {
        "url_parameter"
    }

    async fn initialize(&mut self, page: &dyn Page) -> bool {
        let Ok(url) = page.url().await else {
            return false;
        };
        self.current_page = url_parameter(&url)
            .filter(|p| p.name == self.parameter)
            .map(|p| p.value as usize)
            .unwrap_or(1);
        self.base_url = url;
        self.phase = Phase::Exhaust;
        true
    }

    async fn advance(&mut self, page: &dyn Page) -> bool {
        match self.phase {
            Phase::Exhaust => {
                match scroll_until_stable(page, self.max_scrolls, self.scroll_delay_ms, SCROLL_TOLERANCE).await {
                    Ok(attempts) => ::log::debug!(
                        "Page {} exhausted after {} scrolls",
                        self.current_page,
                        attempts
                    ),
                    Err(e) => ::log::debug!("Scrolling page {} failed: {}", self.current_page, e),
                }
                self.phase = Phase::Navigate;
                true
            }
            Phase::Navigate => {
                let next = self.current_page + 1;
                if next > self.max_pages {
                    ::log::debug!("Reached the last allowed page ({})", self.max_pages);
                    return false;
                }
                let Some(url) = page_url(&self.base_url, &self.parameter, next) else {
                    return false;
                };

                if let Err(e) = page.goto(&url).await {
                    ::log::warn!("Parameter pagination stopped: {}", e);
                    return false;
                }
                if let Err(e) = page.wait_for_network_idle(self.idle_timeout).await {
                    ::log::debug!("Network idle wait on {} abandoned: {}", url, e);
                }
                self.current_page = next;
                self.phase = Phase::Exhaust;

                if !self.verify(page).await {
                    ::log::info!("Page {} has no content, stopping", next);
                    return false;
                }
                ::log::info!("Moved to page {} at {}", next, url);
                true
            }
        }
    }
}
