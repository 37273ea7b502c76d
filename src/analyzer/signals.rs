use crate::browser::{scripts, Page};
use crate::error::Result;
use crate::extractors::dom::{element_count, element_text, Dom};
use serde::Serialize;

/// Flags, counts and metrics computed from one pass over the DOM
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuralSignals {
    pub has_article: bool,
    pub has_main: bool,
    pub has_header: bool,
    pub has_footer: bool,
    pub has_nav: bool,
    pub has_aside: bool,
    pub has_sections: bool,
    pub has_schema_markup: bool,
    pub has_json_ld: bool,
    pub has_aria_landmarks: bool,
    pub has_tables: bool,
    pub has_code_blocks: bool,
    pub has_forms: bool,
    pub element_count: usize,
    pub heading_count: usize,
    pub link_count: usize,
    pub paragraph_count: usize,
    pub image_count: usize,
    pub text_length: usize,
    /// Text length divided by element count
    pub text_density: f64,
    /// Share of the viewport covered by images, in percent
    pub image_area_percent: f64,
}

/// Computes every signal available from a DOM snapshot
pub fn structural_signals(dom: &Dom) -> StructuralSignals {
    let body = dom.first("body").ok().flatten().unwrap_or_else(|| dom.root());
    let element_total = element_count(body);
    let text_length = element_text(body).chars().count();

    StructuralSignals {
        has_article: dom.exists("article"),
        has_main: dom.exists("main, [role='main']"),
        has_header: dom.exists("header, [role='banner']"),
        has_footer: dom.exists("footer, [role='contentinfo']"),
        has_nav: dom.exists("nav, [role='navigation']"),
        has_aside: dom.exists("aside, [role='complementary']"),
        has_sections: dom.exists("section"),
        has_schema_markup: dom.exists("[itemtype], [itemscope]"),
        has_json_ld: dom.exists("script[type='application/ld+json']"),
        has_aria_landmarks: dom.exists("[role]"),
        has_tables: dom.exists("table"),
        has_code_blocks: dom.exists("pre, code"),
        has_forms: dom.exists("form"),
        element_count: element_total,
        heading_count: dom.count("h1, h2, h3, h4, h5, h6"),
        link_count: dom.count("a[href]"),
        paragraph_count: dom.count("p"),
        image_count: dom.count("img"),
        text_length,
        text_density: if element_total == 0 {
            0.0
        } else {
            text_length as f64 / element_total as f64
        },
        image_area_percent: 0.0,
    }
}

/// Structural signals of the live page, including the layout-dependent
/// image area probe
pub async fn detect_page_structure(page: &dyn Page) -> Result<StructuralSignals> {
    let html = page.html().await?;
    let url = page.url().await?;
    let mut signals = structural_signals(&Dom::parse(&html, &url));
    signals.image_area_percent = image_area_percent(page).await;
    Ok(signals)
}

/// Share of the viewport covered by images; a failed probe counts as none
pub async fn image_area_percent(page: &dyn Page) -> f64 {
    match page.evaluate(scripts::IMAGE_AREA).await {
        Ok(value) => value.as_f64().unwrap_or(0.0).clamp(0.0, 100.0),
        Err(e) => {
            ::log::debug!("Image area probe failed: {}", e);
            0.0
        }
    }
}
