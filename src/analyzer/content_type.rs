use crate::extractors::dom::Dom;
use crate::extractors::metadata::json_ld_blocks;
use crate::extractors::recipe::find_recipe;
use serde::Serialize;
use serde_json::Value;

/// Recipes have fewer indicators than the other categories
const RECIPE_WEIGHT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Product,
    Listing,
    Documentation,
    Recipe,
}

impl ContentType {
    /// Evaluation order, which is also the tie-break order
    pub const ALL: [ContentType; 5] = [
        ContentType::Article,
        ContentType::Product,
        ContentType::Listing,
        ContentType::Documentation,
        ContentType::Recipe,
    ];
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContentType::Article => "article",
            ContentType::Product => "product",
            ContentType::Listing => "listing",
            ContentType::Documentation => "documentation",
            ContentType::Recipe => "recipe",
        };
        write!(f, "{}", name)
    }
}

/// Independent boolean indicators for each category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentIndicators {
    pub article: Vec<bool>,
    pub product: Vec<bool>,
    pub listing: Vec<bool>,
    pub documentation: Vec<bool>,
    pub recipe: Vec<bool>,
}

impl ContentIndicators {
    fn for_type(&self, content_type: ContentType) -> &[bool] {
        match content_type {
            ContentType::Article => &self.article,
            ContentType::Product => &self.product,
            ContentType::Listing => &self.listing,
            ContentType::Documentation => &self.documentation,
            ContentType::Recipe => &self.recipe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypeReport {
    /// Score per category in evaluation order
    pub scores: Vec<(ContentType, f64)>,
    pub primary: Option<ContentType>,
    pub secondary: Option<ContentType>,
}

impl ContentTypeReport {
    pub fn score(&self, content_type: ContentType) -> f64 {
        self.scores
            .iter()
            .find(|(t, _)| *t == content_type)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }
}

/// Scores every category and picks the top two.
///
/// Ties keep evaluation order (article, product, listing, documentation,
/// recipe); a category scoring zero is never primary or secondary.
pub fn score_content_types(indicators: &ContentIndicators) -> ContentTypeReport {
    let scores: Vec<(ContentType, f64)> = ContentType::ALL
        .iter()
        .map(|&t| {
            let hits = indicators.for_type(t).iter().filter(|hit| **hit).count() as f64;
            let weight = if t == ContentType::Recipe { RECIPE_WEIGHT } else { 1.0 };
            (t, hits * weight)
        })
        .collect();

    // Stable sort keeps evaluation order among equal scores
    let mut ranked = scores.clone();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut top = ranked.into_iter().filter(|(_, s)| *s > 0.0).map(|(t, _)| t);

    ContentTypeReport {
        primary: top.next(),
        secondary: top.next(),
        scores,
    }
}

/// Indicators observed in a DOM snapshot
pub fn content_indicators(dom: &Dom) -> ContentIndicators {
    let url = dom.url().to_lowercase();
    let json_ld = json_ld_blocks(dom);
    let schema = |types: &[&str]| {
        json_ld.iter().any(|block| has_schema_type(block, types))
            || types
                .iter()
                .any(|t| dom.exists(&format!("[itemtype*='schema.org/{}']", t)))
    };
    let og_type = dom
        .meta_content("meta[property='og:type']")
        .unwrap_or_default()
        .to_lowercase();
    let button_text = |pattern: &[&str]| {
        dom.select("button, a, input[type='submit']")
            .map(|found| {
                found.into_iter().any(|el| {
                    let text = crate::extractors::dom::element_text(el).to_lowercase();
                    pattern.iter().any(|p| text.contains(p))
                })
            })
            .unwrap_or(false)
    };

    ContentIndicators {
        article: vec![
            dom.exists("article"),
            og_type == "article",
            schema(&["Article", "BlogPosting", "NewsArticle"]),
            dom.exists("time[datetime], meta[property='article:published_time']"),
            dom.exists("[rel='author'], .author, .byline, meta[name='author']"),
            dom.count("p") >= 5,
        ],
        product: vec![
            schema(&["Product", "Offer"]),
            og_type == "product" || og_type == "og:product",
            dom.exists("[itemprop='price'], .price, .product-price, [class*='price']"),
            button_text(&["add to cart", "add to basket", "buy now"]),
            dom.exists("[class*='sku'], [itemprop='sku'], .product-gallery, [class*='product-image']"),
            url.contains("/product") || url.contains("/dp/") || url.contains("/item"),
        ],
        listing: vec![
            dom.count("article") >= 3,
            dom.count(".card, .item, [class*='product-card'], [class*='list-item'], [class*='grid-item']") >= 6,
            dom.exists(".pagination, [class*='pager'], [aria-label*='agination']"),
            dom.exists("[class*='filter'], [class*='sort-by'], select[name*='sort']"),
            ["/category", "/search", "/tag/", "/collections", "/list"]
                .iter()
                .any(|p| url.contains(p)),
        ],
        documentation: vec![
            dom.count("pre, pre code") >= 2,
            dom.exists(".toc, #toc, [class*='table-of-contents'], nav[aria-label*='ontents']"),
            dom.exists(".breadcrumb, [class*='breadcrumb'], nav[aria-label*='readcrumb']"),
            dom.exists(".sidebar nav, [class*='docs-sidebar'], [class*='sidebar'] ul ul"),
            url.contains("/docs") || url.contains("docs.") || url.contains("/reference") || url.contains("/api/"),
            schema(&["TechArticle", "APIReference"]),
        ],
        recipe: vec![
            json_ld.iter().any(|block| find_recipe(block).is_some()) || schema(&["Recipe"]),
            dom.exists("[itemprop='recipeIngredient'], [class*='ingredient']"),
            dom.exists("[itemprop='recipeInstructions'], [class*='instruction'], [class*='direction']"),
            dom.exists(".recipe, [class*='recipe-card'], .wprm-recipe-container, .tasty-recipes"),
        ],
    }
}

fn has_schema_type(value: &Value, types: &[&str]) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| has_schema_type(item, types)),
        Value::Object(map) => {
            let direct = match map.get("@type") {
                Some(Value::String(t)) => types.contains(&t.as_str()),
                Some(Value::Array(ts)) => ts
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|t| types.contains(&t)),
                _ => false,
            };
            direct || map.get("@graph").is_some_and(|graph| has_schema_type(graph, types))
        }
        _ => false,
    }
}

/// Content-type classification of a DOM snapshot
pub fn detect_content_type(dom: &Dom) -> ContentTypeReport {
    score_content_types(&content_indicators(dom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(a: usize, p: usize, l: usize, d: usize, r: usize) -> ContentIndicators {
        let hits = |n: usize| (0..6).map(|i| i < n).collect::<Vec<bool>>();
        ContentIndicators {
            article: hits(a),
            product: hits(p),
            listing: hits(l),
            documentation: hits(d),
            recipe: hits(r),
        }
    }

    #[test]
    fn test_ties_follow_evaluation_order() {
        let report = score_content_types(&indicators(2, 2, 2, 2, 0));
        assert_eq!(report.primary, Some(ContentType::Article));
        assert_eq!(report.secondary, Some(ContentType::Product));

        let report = score_content_types(&indicators(0, 0, 3, 3, 0));
        assert_eq!(report.primary, Some(ContentType::Listing));
        assert_eq!(report.secondary, Some(ContentType::Documentation));
    }

    #[test]
    fn test_recipe_is_weighted() {
        // Two weighted recipe hits tie with three article hits; article wins the tie
        let report = score_content_types(&indicators(3, 0, 0, 0, 2));
        assert_eq!(report.score(ContentType::Recipe), 3.0);
        assert_eq!(report.primary, Some(ContentType::Article));
        assert_eq!(report.secondary, Some(ContentType::Recipe));

        let report = score_content_types(&indicators(2, 0, 0, 0, 2));
        assert_eq!(report.primary, Some(ContentType::Recipe));
    }

    #[test]
    fn test_zero_scores_never_classify() {
        let report = score_content_types(&indicators(0, 0, 0, 0, 0));
        assert_eq!(report.primary, None);
        assert_eq!(report.secondary, None);

        let report = score_content_types(&indicators(1, 0, 0, 0, 0));
        assert_eq!(report.secondary, None);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let input = indicators(1, 1, 1, 1, 1);
        let first = score_content_types(&input);
        for _ in 0..10 {
            assert_eq!(score_content_types(&input), first);
        }
        // 1.5 for recipe beats the four single hits
        assert_eq!(first.primary, Some(ContentType::Recipe));
        assert_eq!(first.secondary, Some(ContentType::Article));
    }

    #[test]
    fn test_article_scenario() {
        let dom = Dom::parse("<article><p>A</p><p>B</p></article>", "https://example.com/a");
        let found = content_indicators(&dom);
        assert!(found.article[0]);
        assert!(found.product.iter().all(|hit| !hit));
        assert!(found.listing.iter().all(|hit| !hit));
        assert!(found.documentation.iter().all(|hit| !hit));
        assert!(found.recipe.iter().all(|hit| !hit));
        assert_eq!(detect_content_type(&dom).primary, Some(ContentType::Article));
    }

    #[test]
    fn test_recipe_json_ld_in_graph() {
        let dom = Dom::parse(
            r#"<script type="application/ld+json">{"@graph":[{"@type":"Recipe"}]}</script>"#,
            "https://example.com/r",
        );
        assert!(content_indicators(&dom).recipe[0]);
    }
}
