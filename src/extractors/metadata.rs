//! Title, images and metadata: extracted on every pass regardless of plan.

use super::dom::{element_text, Dom};
use crate::results::ImageData;
use crate::utils::{collapse_whitespace, resolve_url};
use serde_json::Value;

/// Title by ordered fallback: first H1, document title, `og:title`,
/// `twitter:title`
pub fn derive_title(dom: &Dom) -> Option<String> {
    let h1 = dom
        .first("h1")
        .ok()
        .flatten()
        .map(element_text)
        .filter(|t| !t.is_empty());
    if h1.is_some() {
        return h1;
    }

    let title = dom
        .first("title")
        .ok()
        .flatten()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());
    if title.is_some() {
        return title;
    }

    dom.meta_content("meta[property='og:title']")
        .or_else(|| dom.meta_content("meta[name='twitter:title']"))
        .or_else(|| dom.meta_content("meta[property='twitter:title']"))
}

/// Every image with a resolvable source, unique by absolute URL
pub fn extract_images(dom: &Dom) -> Vec<ImageData> {
    let mut images: Vec<ImageData> = Vec::new();
    let Ok(found) = dom.select("img") else {
        return images;
    };

    for img in found {
        let attrs = img.value();
        let source = attrs
            .attr("src")
            .filter(|s| !s.trim().is_empty() && !s.starts_with("data:"))
            .or_else(|| attrs.attr("data-src"))
            .or_else(|| attrs.attr("data-lazy-src"))
            .or_else(|| attrs.attr("data-original"))
            .map(str::to_string)
            .or_else(|| attrs.attr("srcset").and_then(first_srcset_candidate));

        let Some(url) = source.and_then(|s| resolve_url(dom.url(), &s)) else {
            continue;
        };
        if images.iter().any(|i| i.url == url) {
            continue;
        }

        images.push(ImageData {
            url,
            alt: attrs
                .attr("alt")
                .map(collapse_whitespace)
                .filter(|a| !a.is_empty()),
            width: attrs.attr("width").and_then(parse_dimension),
            height: attrs.attr("height").and_then(parse_dimension),
        });
    }

    images
}

fn first_srcset_candidate(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
}

fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").parse().ok()
}

/// Meta tags, canonical link, document language and JSON-LD blocks
pub fn extract_metadata(dom: &Dom) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    if let Ok(metas) = dom.select("meta[content]") {
        for meta in metas {
            let attrs = meta.value();
            let key = attrs
                .attr("name")
                .or_else(|| attrs.attr("property"))
                .or_else(|| attrs.attr("itemprop"))
                .or_else(|| attrs.attr("http-equiv"));
            let (Some(key), Some(content)) = (key, attrs.attr("content")) else {
                continue;
            };
            let content = collapse_whitespace(content);
            if !key.trim().is_empty() && !content.is_empty() {
                entries.push((key.trim().to_lowercase(), content));
            }
        }
    }

    if let Some(href) = dom
        .first("link[rel='canonical']")
        .ok()
        .flatten()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_url(dom.url(), href))
    {
        entries.push(("canonical".to_string(), href));
    }

    if let Some(lang) = dom
        .first("html")
        .ok()
        .flatten()
        .and_then(|html| html.value().attr("lang"))
        .filter(|l| !l.trim().is_empty())
    {
        entries.push(("language".to_string(), lang.trim().to_string()));
    }

    for (index, block) in json_ld_blocks(dom).iter().enumerate() {
        entries.push((format!("json_ld_{}", index), block.to_string()));
    }

    entries
}

/// Parsed `application/ld+json` blocks; malformed blocks are skipped
pub fn json_ld_blocks(dom: &Dom) -> Vec<Value> {
    let Ok(scripts) = dom.select("script[type='application/ld+json']") else {
        return Vec::new();
    };

    scripts
        .into_iter()
        .filter_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    ::log::debug!("Skipping malformed JSON-LD block: {}", e);
                    None
                }
            }
        })
        .collect()
}
