//! Product and documentation pages: host overrides, a generic cascade, and
//! a last resort anchored on the H1.

use super::dom::{collect_blocks, element_text, Dom};
use super::Extractor;
use crate::catalog::{
    overrides_for, DOCUMENTATION_SELECTORS, DOCUMENTATION_SITE_OVERRIDES, PRODUCT_SELECTORS,
    PRODUCT_SITE_OVERRIDES,
};
use crate::error::Result;
use scraper::ElementRef;

/// Sibling blocks collected after the H1 by the last resort rule
const LAST_RESORT_SIBLINGS: usize = 10;

pub struct ProductExtractor;

impl Extractor for ProductExtractor {
    fn name(&self) -> &'static str {
        "product"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        // Product selectors each name one field (title, price, ...) so all of them are unioned
        if let Some(selectors) = overrides_for(PRODUCT_SITE_OVERRIDES, &dom.host()) {
            let found = texts_of_all(dom, selectors)?;
            if !found.is_empty() {
                ::log::debug!("Product override for {} matched", dom.host());
                return Ok(found);
            }
        }

        let found = texts_of_all(dom, PRODUCT_SELECTORS)?;
        if !found.is_empty() {
            return Ok(found);
        }

        last_resort(dom)
    }
}

pub struct DocumentationExtractor;

impl Extractor for DocumentationExtractor {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        if let Some(selectors) = overrides_for(DOCUMENTATION_SITE_OVERRIDES, &dom.host()) {
            let found = first_container(dom, selectors)?;
            if !found.is_empty() {
                ::log::debug!("Documentation override for {} matched", dom.host());
                return Ok(found);
            }
        }

        let found = first_container(dom, DOCUMENTATION_SELECTORS)?;
        if !found.is_empty() {
            return Ok(found);
        }

        last_resort(dom)
    }
}

/// Text of every element matched by any of the selectors, selector by selector
fn texts_of_all(dom: &Dom, selectors: &[&str]) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for selector in selectors {
        for element in dom.select(selector)? {
            let text = element_text(element);
            if !text.is_empty() {
                texts.push(text);
            }
        }
    }
    Ok(texts)
}

/// Blocks of the first container any selector matches with text in it
fn first_container(dom: &Dom, selectors: &[&str]) -> Result<Vec<String>> {
    for selector in selectors {
        for container in dom.select(selector)? {
            let blocks = collect_blocks(container, 1);
            if !blocks.is_empty() {
                return Ok(blocks);
            }
        }
    }
    Ok(Vec::new())
}

/// The first H1 and up to ten `p`/`div` siblings that follow it
fn last_resort(dom: &Dom) -> Result<Vec<String>> {
    let Some(h1) = dom.first("h1")? else {
        return Ok(Vec::new());
    };

    let mut texts = vec![element_text(h1)];
    texts.extend(
        h1.next_siblings()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "p" | "div"))
            .take(LAST_RESORT_SIBLINGS)
            .map(element_text),
    );
    texts.retain(|t| !t.is_empty());
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_host_override_wins() {
        let d = Dom::parse(
            "<span id='productTitle'> Kettle </span><span class='a-price'><span class='a-offscreen'>$25</span></span>\
             <div class='product-title'>Generic title</div>",
            "https://www.amazon.com/dp/B000",
        );
        let found = ProductExtractor.extract(&d).unwrap();
        assert!(found.contains(&"Kettle".to_string()));
        assert!(!found.contains(&"Generic title".to_string()));
    }

    #[test]
    fn test_product_generic_cascade() {
        let d = Dom::parse(
            "<h1 class='product-title'>Lamp</h1><span class='price'>$10</span>",
            "https://shop.example.com/lamp",
        );
        assert_eq!(ProductExtractor.extract(&d).unwrap(), vec!["Lamp", "$10"]);
    }

    #[test]
    fn test_documentation_override_and_fallback() {
        let d = Dom::parse(
            "<div class='docblock'><p>Returns the length.</p></div>",
            "https://docs.rs/foo/latest/foo/",
        );
        assert_eq!(
            DocumentationExtractor.extract(&d).unwrap(),
            vec!["Returns the length."]
        );

        let d = Dom::parse(
            "<h1>Guide</h1><p>Step one</p><span>skip</span><div>Step two</div>",
            "https://example.org/guide",
        );
        assert_eq!(
            DocumentationExtractor.extract(&d).unwrap(),
            vec!["Guide", "Step one", "Step two"]
        );
    }

    #[test]
    fn test_last_resort_caps_siblings() {
        let paragraphs: String = (0..15).map(|i| format!("<p>para {}</p>", i)).collect();
        let d = Dom::parse(&format!("<h1>T</h1>{}", paragraphs), "https://example.org");
        let found = last_resort(&d).unwrap();
        assert_eq!(found.len(), 1 + LAST_RESORT_SIBLINGS);
        assert_eq!(found.last().unwrap(), "para 9");
    }
}
