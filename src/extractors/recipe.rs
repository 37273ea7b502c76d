//! Structured data first: recipes from JSON-LD, then from the DOM.

use super::dom::{element_text, Dom};
use super::metadata::json_ld_blocks;
use super::Extractor;
use crate::error::Result;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;
use serde_json::Value;
use std::sync::LazyLock;

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ingredient|instruction|direction|method|preparation")
        .expect("valid heading pattern")
});

const CONTAINER_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Recipe']",
    ".wprm-recipe-container",
    ".tasty-recipes",
    ".mv-create-card",
    ".recipe-card",
    ".recipe",
    "#recipe",
    "[class*='recipe']",
];

const INGREDIENT_SELECTORS: &[&str] = &[
    "[itemprop='recipeIngredient']",
    "[itemprop='ingredients']",
    ".wprm-recipe-ingredient",
    ".tasty-recipes-ingredients li",
    ".ingredients li",
    ".ingredient-list li",
    "[class*='ingredient'] li",
    "li[class*='ingredient']",
];

const INSTRUCTION_SELECTORS: &[&str] = &[
    "[itemprop='recipeInstructions'] li",
    "[itemprop='recipeInstructions']",
    ".wprm-recipe-instruction-text",
    ".tasty-recipes-instructions li",
    ".instructions li",
    ".directions li",
    ".method li",
    "[class*='instruction'] li",
    "[class*='direction'] li",
    "li[class*='instruction']",
];

/// Recipes, preferring a JSON-LD `Recipe` object over DOM markup
pub struct StructuredDataExtractor;

impl Extractor for StructuredDataExtractor {
    fn name(&self) -> &'static str {
        "structured_data"
    }

    fn extract(&self, dom: &Dom) -> Result<Vec<String>> {
        let blocks = json_ld_blocks(dom);
        if let Some(recipe) = blocks.iter().find_map(find_recipe) {
            let fragments = recipe_from_json_ld(recipe);
            if !fragments.is_empty() {
                ::log::debug!("Recipe taken from JSON-LD ({} fragments)", fragments.len());
                return Ok(fragments);
            }
        }

        Ok(recipe_from_dom(dom))
    }
}

/// Finds a `Recipe` object: top level, inside a top-level array, or in `@graph`
pub fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(map) => {
            if is_recipe_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph")
                .and_then(Value::as_array)
                .and_then(|graph| graph.iter().find_map(find_recipe))
        }
        _ => None,
    }
}

fn is_recipe_type(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(t)) => t == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Recipe")),
        _ => false,
    }
}

/// Fragments for a JSON-LD recipe: name, description, yield, time, then the
/// ingredient and numbered instruction lists in source order
pub fn recipe_from_json_ld(recipe: &Value) -> Vec<String> {
    let mut fragments = Vec::new();

    if let Some(name) = text_field(recipe, "name") {
        fragments.push(name);
    }
    if let Some(description) = text_field(recipe, "description") {
        fragments.push(description);
    }
    if let Some(recipe_yield) = recipe.get("recipeYield").and_then(first_text) {
        fragments.push(format!("Yield: {}", recipe_yield));
    }
    if let Some(total) = text_field(recipe, "totalTime") {
        fragments.push(format!("Total time: {}", total));
    }

    let ingredients: Vec<String> = match recipe.get("recipeIngredient").or_else(|| recipe.get("ingredients")) {
        Some(Value::Array(items)) => items.iter().filter_map(first_text).collect(),
        Some(Value::String(single)) => vec![clean(single)],
        _ => Vec::new(),
    };
    if !ingredients.is_empty() {
        fragments.push("Ingredients".to_string());
        fragments.extend(ingredients);
    }

    let mut steps = Vec::new();
    if let Some(instructions) = recipe.get("recipeInstructions") {
        collect_steps(instructions, &mut steps);
    }
    if !steps.is_empty() {
        fragments.push("Instructions".to_string());
        let mut number = 0;
        for step in steps {
            match step {
                Step::Section(name) => fragments.push(name),
                Step::Text(text) => {
                    number += 1;
                    fragments.push(format!("{}. {}", number, text));
                }
            }
        }
    }

    fragments.retain(|f| !f.is_empty());
    fragments
}

enum Step {
    Section(String),
    Text(String),
}

/// Flattens strings, `HowToStep` and `HowToSection` values into steps
fn collect_steps(value: &Value, steps: &mut Vec<Step>) {
    match value {
        Value::String(text) => {
            // A single string may hold several steps separated by newlines
            for line in text.lines().map(clean).filter(|l| !l.is_empty()) {
                steps.push(Step::Text(line));
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_steps(item, steps)),
        Value::Object(map) => {
            if let Some(items) = map.get("itemListElement") {
                if let Some(name) = map.get("name").and_then(Value::as_str).map(clean) {
                    if !name.is_empty() {
                        steps.push(Step::Section(name));
                    }
                }
                collect_steps(items, steps);
            } else if let Some(text) = map
                .get("text")
                .or_else(|| map.get("name"))
                .and_then(Value::as_str)
                .map(clean)
            {
                if !text.is_empty() {
                    steps.push(Step::Text(text));
                }
            }
        }
        _ => {}
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(first_text)
}

/// A string, the first string of an array, or an object's `text`/`name`
fn first_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => clean(s),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => return items.iter().find_map(first_text),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .map(clean)?,
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

/// Collapses whitespace and strips tags some publishers leave in JSON-LD
fn clean(text: &str) -> String {
    static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
    crate::utils::collapse_whitespace(&TAGS.replace_all(text, " "))
}

/// DOM fallback: container cascade, then selector cascades, then a walk
/// from recipe-like headings
fn recipe_from_dom(dom: &Dom) -> Vec<String> {
    let container = CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| dom.first(selector).ok().flatten());

    let scope = container.unwrap_or_else(|| dom.root());

    let mut ingredients = first_matching_list(scope, INGREDIENT_SELECTORS);
    let mut instructions = first_matching_list(scope, INSTRUCTION_SELECTORS);

    if ingredients.is_empty() || instructions.is_empty() {
        let (walked_ingredients, walked_instructions) = heading_walk(dom);
        if ingredients.is_empty() {
            ingredients = walked_ingredients;
        }
        if instructions.is_empty() {
            instructions = walked_instructions;
        }
    }

    // A lone "Method" heading on an ordinary page is not a recipe
    if ingredients.is_empty() {
        return Vec::new();
    }

    let mut fragments = Vec::new();
    if let Some(container) = container {
        if let Some(name) = ["[itemprop='name']", ".wprm-recipe-name", ".recipe-title", "h2", "h3"]
            .iter()
            .filter_map(|s| super::dom::parse_selector(s).ok())
            .find_map(|s| container.select(&s).next())
            .map(element_text)
            .filter(|t| !t.is_empty())
        {
            fragments.push(name);
        }
    }

    fragments.push("Ingredients".to_string());
    fragments.extend(ingredients);
    if !instructions.is_empty() {
        fragments.push("Instructions".to_string());
        fragments.extend(
            instructions
                .into_iter()
                .enumerate()
                .map(|(i, step)| format!("{}. {}", i + 1, step)),
        );
    }
    fragments
}

fn first_matching_list(scope: ElementRef<'_>, selectors: &[&str]) -> Vec<String> {
    for selector in selectors {
        let Ok(parsed) = super::dom::parse_selector(selector) else {
            continue;
        };
        let items: Vec<String> = scope
            .select(&parsed)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

/// Walks the siblings after each matching heading until the next heading of
/// the same or higher level, collecting list items (or paragraphs)
fn heading_walk(dom: &Dom) -> (Vec<String>, Vec<String>) {
    let mut ingredients = Vec::new();
    let mut instructions = Vec::new();

    let Ok(headings) = dom.select("h2, h3, h4, h5") else {
        return (ingredients, instructions);
    };

    for heading in headings {
        let title = element_text(heading);
        if !SECTION_HEADING.is_match(&title) {
            continue;
        }
        let level = heading_level(heading.value().name()).unwrap_or(6);
        let items = items_until_next_heading(heading, level);
        if items.is_empty() {
            continue;
        }

        if title.to_lowercase().contains("ingredient") {
            if ingredients.is_empty() {
                ingredients = items;
            }
        } else if instructions.is_empty() {
            instructions = items;
        }
    }

    (ingredients, instructions)
}

fn items_until_next_heading(heading: ElementRef<'_>, level: u8) -> Vec<String> {
    let mut list_items = Vec::new();
    let mut paragraphs = Vec::new();

    for sibling in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(sibling) else {
            continue;
        };
        if let Some(next_level) = heading_level(el.value().name()) {
            if next_level <= level {
                break;
            }
        }

        match el.value().name() {
            "ul" | "ol" => {
                for li in el.children().filter_map(ElementRef::wrap) {
                    if li.value().name() == "li" {
                        let text = element_text(li);
                        if !text.is_empty() {
                            list_items.push(text);
                        }
                    }
                }
            }
            "p" => {
                let text = element_text(el);
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
            _ => {
                // Wrapper divs: take their list items
                for node in el.descendants() {
                    if let Node::Element(inner) = node.value() {
                        if inner.name() == "li" {
                            if let Some(li) = ElementRef::wrap(node) {
                                let text = element_text(li);
                                if !text.is_empty() {
                                    list_items.push(text);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    if list_items.is_empty() { paragraphs } else { list_items }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_recipe_direct_array_type_and_graph() {
        let direct = json!({"@type": "Recipe", "name": "A"});
        assert!(find_recipe(&direct).is_some());

        let array_type = json!({"@type": ["Recipe", "NewsArticle"], "name": "B"});
        assert!(find_recipe(&array_type).is_some());

        let graph = json!({"@context": "https://schema.org", "@graph": [
            {"@type": "WebPage"},
            {"@type": "Recipe", "name": "C"}
        ]});
        assert_eq!(find_recipe(&graph).unwrap()["name"], "C");

        let top_array = json!([{"@type": "Organization"}, {"@type": "Recipe", "name": "D"}]);
        assert_eq!(find_recipe(&top_array).unwrap()["name"], "D");

        assert!(find_recipe(&json!({"@type": "Article"})).is_none());
    }

    #[test]
    fn test_recipe_fragments_in_source_order() {
        let recipe = json!({
            "@type": "Recipe",
            "recipeIngredient": ["1 cup flour"],
            "recipeInstructions": ["Mix well"]
        });
        assert_eq!(
            recipe_from_json_ld(&recipe),
            vec!["Ingredients", "1 cup flour", "Instructions", "1. Mix well"]
        );
    }

    #[test]
    fn test_how_to_sections_number_continuously() {
        let recipe = json!({
            "@type": "Recipe",
            "name": "Bread",
            "recipeYield": ["1 loaf", "8 slices"],
            "recipeIngredient": ["flour", "water"],
            "recipeInstructions": [
                {"@type": "HowToSection", "name": "Dough", "itemListElement": [
                    {"@type": "HowToStep", "text": "Combine."},
                    {"@type": "HowToStep", "text": "Knead <b>well</b>."}
                ]},
                {"@type": "HowToSection", "name": "Bake", "itemListElement": [
                    {"@type": "HowToStep", "text": "Bake 30 min."}
                ]}
            ]
        });
        assert_eq!(
            recipe_from_json_ld(&recipe),
            vec![
                "Bread",
                "Yield: 1 loaf",
                "Ingredients",
                "flour",
                "water",
                "Instructions",
                "Dough",
                "1. Combine.",
                "2. Knead well .",
                "Bake",
                "3. Bake 30 min.",
            ]
        );
    }

    #[test]
    fn test_heading_walk_fallback() {
        let dom = Dom::parse(
            r#"<body><h2>Ingredients</h2><ul><li>2 eggs</li><li>Salt</li></ul>
               <h2>Method</h2><ol><li>Whisk</li><li>Fry</li></ol>
               <h2>Comments</h2><ul><li>Nice!</li></ul></body>"#,
            "https://example.com/omelette",
        );
        let fragments = StructuredDataExtractor.extract(&dom).unwrap();
        assert_eq!(
            fragments,
            vec!["Ingredients", "2 eggs", "Salt", "Instructions", "1. Whisk", "2. Fry"]
        );
    }

    #[test]
    fn test_method_heading_alone_is_not_a_recipe() {
        let dom = Dom::parse(
            "<h2>Method</h2><p>We sampled 40 participants.</p>",
            "https://example.com/paper",
        );
        assert!(StructuredDataExtractor.extract(&dom).unwrap().is_empty());
    }
}
