use crate::error::{Error, Result};
use crate::utils::{collapse_whitespace, host_of};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements whose text never counts as content
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];

/// Elements that flow inside a line and so add no separator
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "em", "i", "label", "mark", "q", "s", "small", "span",
    "strong", "sub", "sup", "time", "u",
];

/// Text-bearing block elements collected by the container heuristics
pub const BLOCK_SELECTOR: &str =
    "h1, h2, h3, h4, h5, h6, p, li, blockquote, pre, figcaption, dt, dd";

/// A parsed snapshot of the live DOM
pub struct Dom {
    html: Html,
    url: String,
}

impl Dom {
    /// Parse a serialized snapshot taken from `url`
    pub fn parse(html: &str, url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Host of the page without `www.`
    pub fn host(&self) -> String {
        host_of(&self.url).unwrap_or_default()
    }

    pub fn document(&self) -> &Html {
        &self.html
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements matching a selector, in document order
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let parsed = parse_selector(selector)?;
        Ok(self.html.select(&parsed).collect())
    }

    /// First element matching a selector
    pub fn first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let parsed = parse_selector(selector)?;
        Ok(self.html.select(&parsed).next())
    }

    /// Whether anything matches the selector (invalid selectors count as no)
    pub fn exists(&self, selector: &str) -> bool {
        matches!(self.first(selector), Ok(Some(_)))
    }

    pub fn count(&self, selector: &str) -> usize {
        self.select(selector).map(|found| found.len()).unwrap_or(0)
    }

    /// `content` attribute of the first meta tag matching the selector
    pub fn meta_content(&self, selector: &str) -> Option<String> {
        self.first(selector)
            .ok()
            .flatten()
            .and_then(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty())
    }
}

/// Parse a CSS selector, mapping failures into the crate error
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Visible text of an element with whitespace collapsed.
///
/// Script-like elements are skipped and block boundaries become spaces,
/// so `<p>a</p><p>b</p>` reads as "a b" rather than "ab".
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if SKIPPED_TAGS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    let inline = INLINE_TAGS.contains(&el.name());
                    if !inline {
                        out.push(' ');
                    }
                    push_text(child_el, out);
                    if !inline {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Whether the element sits inside navigation, header, footer or sidebar chrome
pub fn in_chrome(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| match node.value() {
        Node::Element(el) => {
            matches!(el.name(), "nav" | "header" | "footer" | "aside")
                || matches!(
                    el.attr("role"),
                    Some("navigation") | Some("banner") | Some("contentinfo")
                )
        }
        _ => false,
    })
}

/// Text of the outermost block elements inside `container`, in document order.
///
/// A block nested in another matched block (a `p` inside an `li`) is left to
/// its ancestor. When the container has no blocks at all its own text is used.
pub fn collect_blocks(container: ElementRef<'_>, min_len: usize) -> Vec<String> {
    let selector = match parse_selector(BLOCK_SELECTOR) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let blocks: Vec<ElementRef> = container.select(&selector).collect();
    if blocks.is_empty() {
        let text = element_text(container);
        return if text.chars().count() >= min_len.max(1) {
            vec![text]
        } else {
            Vec::new()
        };
    }

    let ids: HashSet<_> = blocks.iter().map(|b| b.id()).collect();
    let container_id = container.id();

    blocks
        .into_iter()
        .filter(|block| {
            !block
                .ancestors()
                .take_while(|node| node.id() != container_id)
                .any(|node| ids.contains(&node.id()))
        })
        .map(element_text)
        .filter(|text| text.chars().count() >= min_len.max(1))
        .collect()
}

/// Number of descendant elements
pub fn element_count(element: ElementRef<'_>) -> usize {
    element
        .descendants()
        .filter(|node| node.value().is_element())
        .count()
}

/// Number of descendant elements with the given tag name
pub fn count_tag(element: ElementRef<'_>, tag: &str) -> usize {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == tag)
        .count()
}

/// Share of the element's text that sits inside links
pub fn link_density(element: ElementRef<'_>) -> f64 {
    let total = element_text(element).chars().count();
    if total == 0 {
        return 1.0;
    }
    let linked: usize = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .map(|a| element_text(a).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// A short selector that identifies the element (id, else tag plus classes)
pub fn describe_selector(element: ElementRef<'_>) -> String {
    let value = element.value();
    if let Some(id) = value.id() {
        if is_css_ident(id) {
            return format!("#{}", id);
        }
    }

    let classes: Vec<&str> = value.classes().filter(|c| is_css_ident(c)).collect();
    if classes.is_empty() {
        value.name().to_string()
    } else {
        format!("{}.{}", value.name(), classes.join("."))
    }
}

fn is_css_ident(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with(|c: char| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
