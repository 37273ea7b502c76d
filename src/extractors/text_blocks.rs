//! Heuristics that rank blocks by how much text they carry.

use super::dom::{
    collect_blocks, count_tag, element_count, element_text, in_chrome, link_density, Dom,
};
use super::Extractor;
use crate::error::Result;
use scraper::ElementRef;

const CANDIDATE_BLOCKS: &str = "div, section, article, main, td";

/// The block with the best paragraph count and text length score
pub struct LargestBlockExtractor;

impl Extractor for LargestBlockExtractor {
    fn name(&self) -> &'static str {
        "largest_block"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let best = dom
            .select(CANDIDATE_BLOCKS)?
            .into_iter()
            .filter(|block| !in_chrome(*block))
            .map(|block| (block_score(block), block))
            .filter(|(score, _)| *score > 0.0)
            .max_by(|a, b| a.0.total_cmp(&b.0));

        Ok(best
            .map(|(_, block)| collect_blocks(block, 20))
            .unwrap_or_default())
    }
}

/// Paragraphs count 50 points each on top of the text length; link-heavy
/// blocks (menus, tag clouds) are scaled down by their link density
pub fn block_score(block: ElementRef<'_>) -> f64 {
    let paragraphs = count_tag(block, "p");
    if paragraphs == 0 {
        return 0.0;
    }
    let length = element_text(block).chars().count();
    let raw = (paragraphs * 50 + length) as f64;
    raw * (1.0 - link_density(block))
}

/// Catch-all: every paragraph of 20+ characters and every heading outside
/// the page chrome
pub struct BasicExtractor;

impl Extractor for BasicExtractor {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        Ok(dom
            .select("h1, h2, h3, h4, h5, h6, p")?
            .into_iter()
            .filter(|el| !in_chrome(*el))
            .filter_map(|el| {
                let text = element_text(el);
                let heading = el.value().name() != "p";
                (!text.is_empty() && (heading || text.chars().count() >= 20)).then_some(text)
            })
            .collect())
    }
}

/// The five densest text blocks (text length per element), in document order
pub struct TextDensityExtractor;

impl Extractor for TextDensityExtractor {
    fn name(&self) -> &'static str {
        "text_density"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let mut ranked: Vec<(usize, f64, String)> = dom
            .select("div, section, article, p, td, blockquote")?
            .into_iter()
            .enumerate()
            .filter(|(_, block)| !in_chrome(*block))
            .filter_map(|(index, block)| {
                let text = element_text(block);
                let length = text.chars().count();
                if length < 100 {
                    return None;
                }
                let density = length as f64 / (element_count(block) + 1) as f64;
                Some((index, density, text))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(5);
        ranked.sort_by_key(|(index, _, _)| *index);

        Ok(ranked.into_iter().map(|(_, _, text)| text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "A reasonably long paragraph of body text that clearly belongs to the article.";

    #[test]
    fn test_largest_block_prefers_paragraphs_over_links() {
        let links = (0..30)
            .map(|i| format!("<a href='/{}'>Navigation link number {}</a>", i, i))
            .collect::<String>();
        let d = Dom::parse(
            &format!(
                "<div id='menu'><p>{}</p></div><div id='story'><p>{}</p><p>{}</p></div>",
                links, LONG, LONG
            ),
            "https://example.com",
        );
        assert_eq!(LargestBlockExtractor.extract(&d).unwrap(), vec![LONG, LONG]);
    }

    #[test]
    fn test_block_score_zero_without_paragraphs() {
        let d = Dom::parse("<div>Only loose text here</div>", "https://example.com");
        assert_eq!(block_score(d.first("div").unwrap().unwrap()), 0.0);
    }

    #[test]
    fn test_basic_skips_short_paragraphs_and_chrome() {
        let d = Dom::parse(
            &format!(
                "<header><h1>Site</h1></header><h1>Title</h1><p>tiny</p><p>{}</p><footer><p>{}</p></footer>",
                LONG, LONG
            ),
            "https://example.com",
        );
        assert_eq!(BasicExtractor.extract(&d).unwrap(), vec!["Title", LONG]);
    }

    #[test]
    fn test_text_density_keeps_document_order() {
        let second = format!("{} And then some more words here.", LONG);
        let d = Dom::parse(
            &format!("<p>{}</p><p>short</p><p>{}</p>", LONG.repeat(2), second),
            "https://example.com",
        );
        let found = TextDensityExtractor.extract(&d).unwrap();
        assert_eq!(found, vec![LONG.repeat(2), second]);
    }
}
