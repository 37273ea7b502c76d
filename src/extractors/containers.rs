//! Heuristics that assume content lives inside one recognisable container.

use super::dom::{collect_blocks, element_text, in_chrome, parse_selector, Dom, BLOCK_SELECTOR};
use super::Extractor;
use crate::error::Result;
use scraper::ElementRef;
use std::collections::HashMap;

/// Shortest fragment the broader container heuristics keep
const MIN_FRAGMENT: usize = 20;

const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "[role='main']",
    "#main-content",
    "#content",
    "#main",
    ".main-content",
    ".post-content",
    ".entry-content",
    ".article-body",
    ".article-content",
    ".content",
];

const SEMANTIC_SELECTORS: &str = "[itemprop='articleBody'], [itemprop='text'], [itemprop='description'], \
     [itemtype*='schema.org/Article'], [itemtype*='schema.org/BlogPosting'], \
     [itemtype*='schema.org/NewsArticle'], [role='document']";

const COLUMN_SELECTORS: &str = "[class*='column'], [class*='col-'], .row > div, [class*='grid'] > div, \
     [class*='layout'] > div";

const SINGLE_COLUMN_SELECTORS: &[&str] = &[
    ".site-content",
    "#primary",
    ".container",
    ".wrapper",
    "#wrapper",
    "#page",
    ".page",
    "[class*='single']",
];

/// Text inside `<article>` elements
pub struct ArticleExtractor;

impl Extractor for ArticleExtractor {
    fn name(&self) -> &'static str {
        "article"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        Ok(dom
            .select("article, [role='article']")?
            .into_iter()
            .flat_map(|article| collect_blocks(article, 1))
            .collect())
    }
}

/// The first well-known main content container that holds text
pub struct MainContentExtractor;

impl Extractor for MainContentExtractor {
    fn name(&self) -> &'static str {
        "main_content"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        for selector in MAIN_CONTENT_SELECTORS {
            if let Some(container) = dom.first(selector)? {
                let blocks = collect_blocks(container, MIN_FRAGMENT);
                if !blocks.is_empty() {
                    return Ok(blocks);
                }
            }
        }
        Ok(Vec::new())
    }
}

/// Regions marked up with ARIA roles or schema.org microdata
pub struct SemanticExtractor;

impl Extractor for SemanticExtractor {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let regions = dom.select(SEMANTIC_SELECTORS)?;
        Ok(outermost(regions)
            .into_iter()
            .flat_map(|region| collect_blocks(region, MIN_FRAGMENT))
            .collect())
    }
}

/// Blocks that sit between the page header and the page footer
pub struct BoundedRegionExtractor;

impl Extractor for BoundedRegionExtractor {
    fn name(&self) -> &'static str {
        "bounded_region"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let header = dom.first("header, [role='banner']")?;
        let footer = dom.select("footer, [role='contentinfo']")?.into_iter().last();
        if header.is_none() && footer.is_none() {
            return Ok(Vec::new());
        }

        let positions: HashMap<_, usize> = dom
            .root()
            .descendants()
            .enumerate()
            .map(|(index, node)| (node.id(), index))
            .collect();
        let position = |el: ElementRef<'_>| positions.get(&el.id()).copied().unwrap_or(0);

        // Everything up to the last node inside the header belongs to it
        let start = header
            .and_then(|h| h.descendants().last().map(|last| positions.get(&last.id()).copied()))
            .flatten()
            .unwrap_or(0);
        let end = footer.map(position).unwrap_or(usize::MAX);

        let selector = parse_selector(BLOCK_SELECTOR)?;
        let blocks: Vec<ElementRef> = dom
            .document()
            .select(&selector)
            .filter(|block| {
                let at = position(*block);
                at > start && at < end && !in_chrome(*block)
            })
            .collect();

        Ok(outermost(blocks)
            .into_iter()
            .map(element_text)
            .filter(|text| text.chars().count() >= MIN_FRAGMENT)
            .collect())
    }
}

/// The text-heaviest column of a multi-column layout
pub struct MultiColumnExtractor;

impl Extractor for MultiColumnExtractor {
    fn name(&self) -> &'static str {
        "multi_column"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let best = dom
            .select(COLUMN_SELECTORS)?
            .into_iter()
            .filter(|column| !in_chrome(*column))
            .map(|column| (element_text(column).chars().count(), column))
            .filter(|(length, _)| *length >= 200)
            .max_by_key(|(length, _)| *length);

        Ok(best
            .map(|(_, column)| collect_blocks(column, MIN_FRAGMENT))
            .unwrap_or_default())
    }
}

/// Every `<section>` outside the page chrome
pub struct SectionsExtractor;

impl Extractor for SectionsExtractor {
    fn name(&self) -> &'static str {
        "sections"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let sections: Vec<ElementRef> = dom
            .select("section, [class*='section']")?
            .into_iter()
            .filter(|section| !in_chrome(*section))
            .collect();

        Ok(outermost(sections)
            .into_iter()
            .flat_map(|section| collect_blocks(section, MIN_FRAGMENT))
            .collect())
    }
}

/// A centred single-column wrapper, for layouts without semantic markup
pub struct SingleColumnExtractor;

impl Extractor for SingleColumnExtractor {
    fn name(&self) -> &'static str {
        "single_column"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        for selector in SINGLE_COLUMN_SELECTORS {
            for container in dom.select(selector)? {
                if in_chrome(container) || element_text(container).chars().count() < 200 {
                    continue;
                }
                let blocks: Vec<String> = collect_blocks(container, MIN_FRAGMENT);
                if !blocks.is_empty() {
                    return Ok(blocks);
                }
            }
        }
        Ok(Vec::new())
    }
}

/// Drops elements nested inside another element of the same list
fn outermost(elements: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: std::collections::HashSet<_> = elements.iter().map(|e| e.id()).collect();
    elements
        .into_iter()
        .filter(|el| !el.ancestors().any(|node| ids.contains(&node.id())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom(html: &str) -> Dom {
        Dom::parse(html, "https://example.com/post")
    }

    const LONG: &str = "This paragraph is long enough to count as real content.";

    #[test]
    fn test_article_keeps_short_blocks_in_order() {
        let d = dom("<article><p>A</p><p>B</p></article>");
        assert_eq!(ArticleExtractor.extract(&d).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_main_content_cascade_skips_empty_containers() {
        let d = dom(&format!(
            "<main><p>short</p></main><div id='content'><p>{}</p></div>",
            LONG
        ));
        assert_eq!(MainContentExtractor.extract(&d).unwrap(), vec![LONG]);
    }

    #[test]
    fn test_semantic_regions_are_not_repeated_when_nested() {
        let d = dom(&format!(
            "<div itemtype='https://schema.org/Article'><div itemprop='articleBody'><p>{}</p></div></div>",
            LONG
        ));
        assert_eq!(SemanticExtractor.extract(&d).unwrap(), vec![LONG]);
    }

    #[test]
    fn test_bounded_region_excludes_header_and_footer() {
        let d = dom(&format!(
            "<body><header><p>Site header with a long tagline text</p></header>\
             <div><p>{}</p></div>\
             <footer><p>Copyright notice that is quite long</p></footer>\
             <p>Trailing paragraph after the footer element</p></body>",
            LONG
        ));
        assert_eq!(BoundedRegionExtractor.extract(&d).unwrap(), vec![LONG]);
    }

    #[test]
    fn test_bounded_region_needs_a_boundary() {
        let d = dom(&format!("<div><p>{}</p></div>", LONG));
        assert!(BoundedRegionExtractor.extract(&d).unwrap().is_empty());
    }

    #[test]
    fn test_multi_column_picks_heaviest_column() {
        let body = LONG.repeat(5);
        let d = dom(&format!(
            "<div class='row'><div class='col-4'><p>Sidebar links and other bits</p></div>\
             <div class='col-8'><p>{}</p></div></div>",
            body
        ));
        assert_eq!(MultiColumnExtractor.extract(&d).unwrap(), vec![body]);
    }

    #[test]
    fn test_sections_outside_chrome() {
        let d = dom(&format!(
            "<nav><section><p>Navigation section that is long</p></section></nav>\
             <section><h2>Overview of the topic at hand</h2><p>{}</p></section>",
            LONG
        ));
        assert_eq!(
            SectionsExtractor.extract(&d).unwrap(),
            vec!["Overview of the topic at hand", LONG]
        );
    }

    #[test]
    fn test_single_column_requires_substantial_text() {
        let d = dom(&format!(
            "<div class='container'><p>tiny</p></div><div class='wrapper'><p>{}</p><p>{}</p><p>{}</p><p>{}</p></div>",
            LONG, LONG, LONG, LONG
        ));
        assert_eq!(SingleColumnExtractor.extract(&d).unwrap(), vec![LONG, LONG, LONG, LONG]);
    }
}
