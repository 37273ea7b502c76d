use crate::extractors::dom::{describe_selector, element_text, Dom};
use crate::utils::resolve_url;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static URL_PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&](page|p|pg|offset|start|limit|skip)=(\d+)").expect("valid parameter pattern")
});

static URL_PATH_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/page/(\d+)").expect("valid path pattern"));

static LOAD_MORE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(load|show|view|see) more|more results|load next").expect("valid load more pattern")
});

static NEXT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(next|next page|next ›|next »|›|»|→|>)$").expect("valid next pattern")
});

static MORE_LINK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)older (posts|entries)|newer (posts|entries)|more (posts|articles|stories)|previous page|view all")
        .expect("valid text link pattern")
});

const PAGINATION_CONTAINERS: &str = ".pagination, .pager, [class*='paginat'], [class*='pager'], \
     nav[aria-label*='agination'], [role='navigation'][aria-label*='age']";

/// The method the orchestrator should use to surface more content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationType {
    Url,
    LoadMore,
    NextLink,
    Numbered,
    Infinite,
    TextLink,
    None,
}

/// A pagination parameter found in the page URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlParameter {
    pub name: String,
    pub value: u64,
}

/// Everything the analyzer found that hints at pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMethods {
    pub url_parameter: Option<UrlParameter>,
    pub url_path_page: Option<u64>,
    pub has_pagination_container: bool,
    pub numbered_links: usize,
    pub next_link: Option<String>,
    pub has_prev_link: bool,
    pub load_more_selector: Option<String>,
    pub text_link_selector: Option<String>,
    pub lazy_loading: bool,
    /// Set once the infinite scroll probe has run
    pub infinite_scroll: bool,
    pub primary: PaginationType,
}

impl PaginationMethods {
    /// Primary method by fixed priority: url, load-more, next-link,
    /// numbered, infinite, text-link, none
    pub fn resolve_primary(&self) -> PaginationType {
        if self.url_parameter.is_some() || self.url_path_page.is_some() {
            PaginationType::Url
        } else if self.load_more_selector.is_some() {
            PaginationType::LoadMore
        } else if self.next_link.is_some() {
            PaginationType::NextLink
        } else if self.numbered_links > 1 {
            PaginationType::Numbered
        } else if self.infinite_scroll || self.lazy_loading {
            PaginationType::Infinite
        } else if self.text_link_selector.is_some() {
            PaginationType::TextLink
        } else {
            PaginationType::None
        }
    }

    /// Records the infinite scroll verdict and recomputes the primary method
    pub fn set_infinite_scroll(&mut self, detected: bool) {
        self.infinite_scroll = detected;
        self.primary = self.resolve_primary();
    }
}

/// Pagination parameter in a URL, e.g. `?page=2` or `&offset=40`
pub fn url_parameter(url: &str) -> Option<UrlParameter> {
    let captures = URL_PARAMETER.captures(url)?;
    Some(UrlParameter {
        name: captures.get(1)?.as_str().to_string(),
        value: captures.get(2)?.as_str().parse().ok()?,
    })
}

/// Page number in a `/page/N` path segment
pub fn url_path_page(url: &str) -> Option<u64> {
    URL_PATH_PAGE.captures(url)?.get(1)?.as_str().parse().ok()
}

/// Pagination hints in the page URL and a DOM snapshot
pub fn detect_pagination_methods(dom: &Dom, url: &str) -> PaginationMethods {
    let container = dom.first(PAGINATION_CONTAINERS).ok().flatten();

    // Numbered links inside a pagination container, or anywhere when there is none
    let scope = container.unwrap_or_else(|| dom.root());
    let numbered_links = match crate::extractors::dom::parse_selector("a[href]") {
        Ok(anchors) => scope
            .select(&anchors)
            .filter(|a| {
                let text = element_text(*a);
                !text.is_empty() && text.len() <= 3 && text.chars().all(|c| c.is_ascii_digit())
            })
            .count(),
        Err(_) => 0,
    };

    let next_link = dom
        .first("link[rel='next'], a[rel='next']")
        .ok()
        .flatten()
        .or_else(|| {
            dom.select("a[href]").ok().and_then(|anchors| {
                anchors.into_iter().find(|a| {
                    NEXT_TEXT.is_match(&element_text(*a))
                        || a.value()
                            .attr("aria-label")
                            .is_some_and(|label| label.to_lowercase().starts_with("next"))
                })
            })
        })
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_url(url, href));

    let has_prev_link = dom.exists("link[rel='prev'], a[rel='prev']")
        || dom
            .select("a[href]")
            .map(|anchors| {
                anchors.into_iter().any(|a| {
                    let text = element_text(a).to_lowercase();
                    text == "prev" || text == "previous" || text == "‹" || text == "«"
                })
            })
            .unwrap_or(false);

    let load_more_selector = dom
        .select("button, a, [role='button'], [class*='load-more'], [class*='loadmore']")
        .ok()
        .and_then(|candidates| {
            candidates.into_iter().find(|el| {
                let classes = el.value().attr("class").unwrap_or_default().to_lowercase();
                classes.contains("load-more")
                    || classes.contains("loadmore")
                    || LOAD_MORE_TEXT.is_match(&element_text(*el))
            })
        })
        .map(describe_selector);

    let text_link_selector = dom
        .select("a[href]")
        .ok()
        .and_then(|anchors| {
            anchors
                .into_iter()
                .find(|a| MORE_LINK_TEXT.is_match(&element_text(*a)))
        })
        .map(describe_selector);

    let mut methods = PaginationMethods {
        url_parameter: url_parameter(url),
        url_path_page: url_path_page(url),
        has_pagination_container: container.is_some(),
        numbered_links,
        next_link,
        has_prev_link,
        load_more_selector,
        text_link_selector,
        lazy_loading: dom.exists("img[loading='lazy'], img[data-src], img.lazyload, [data-infinite-scroll]"),
        infinite_scroll: false,
        primary: PaginationType::None,
    };
    methods.primary = methods.resolve_primary();
    methods
}
