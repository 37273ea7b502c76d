//! Named selector and keyword tables.
//!
//! Kept out of the heuristics so each table can be swapped through
//! configuration or tested on its own.

/// Candidate "next page" / "load more" controls, tried in order by the
/// click fallback stage.
pub const CLICK_PAGINATION_SELECTORS: &[&str] = &[
    "button.load-more",
    "a.load-more",
    ".load-more button",
    ".load-more a",
    "#load-more",
    "[data-testid='load-more']",
    "[data-action='load-more']",
    "button[class*='load-more']",
    "button[class*='loadMore']",
    "a[class*='load-more']",
    "button.show-more",
    "a.show-more",
    "button[class*='show-more']",
    "button[class*='showMore']",
    "button.view-more",
    "a.view-more",
    "button[class*='view-more']",
    "button.see-more",
    "button[class*='see-more']",
    "button.more-results",
    "a.more-results",
    "button[aria-label*='more']",
    "button[aria-label*='More']",
    "a[rel='next']",
    "a.next",
    "a.next-page",
    "button.next",
    "button.next-page",
    "li.next a",
    ".next a",
    ".pagination .next",
    ".pagination a[aria-label='Next']",
    ".pager-next a",
    "a[aria-label='Next page']",
    "button[aria-label='Next page']",
    "a.pagination-next",
    "button.pagination-next",
    ".infinite-scroll-button",
    ".js-load-more",
    "[data-load-more]",
];

/// Host-specific product selectors, checked before the generic cascade.
pub const PRODUCT_SITE_OVERRIDES: &[(&str, &[&str])] = &[
    (
        "amazon.",
        &[
            "#productTitle",
            "#corePrice_feature_div .a-offscreen",
            "#feature-bullets li",
            "#productDescription p",
        ],
    ),
    (
        "ebay.",
        &[
            ".x-item-title__mainTitle",
            ".x-price-primary",
            ".ux-layout-section__item--table-view .ux-labels-values",
            "#desc_div",
        ],
    ),
    (
        "etsy.com",
        &[
            "h1[data-buy-box-listing-title]",
            "[data-buy-box-region='price'] p",
            "[data-product-details-description-text-content]",
        ],
    ),
    (
        "walmart.com",
        &[
            "h1[itemprop='name']",
            "[itemprop='price']",
            "[data-testid='product-description-content']",
        ],
    ),
    (
        "bestbuy.com",
        &[".sku-title h1", ".priceView-customer-price span", ".product-description"],
    ),
];

/// Generic product selectors, tried in order.
pub const PRODUCT_SELECTORS: &[&str] = &[
    "[itemtype*='schema.org/Product'] [itemprop='name']",
    "[itemtype*='schema.org/Product'] [itemprop='description']",
    ".product-title",
    ".product-name",
    "[itemprop='price']",
    ".product-price",
    ".price",
    ".product-description",
    "#product-description",
    ".product-details li",
    ".product-features li",
    ".product-specs li",
];

/// Host-specific documentation selectors, checked before the generic cascade.
pub const DOCUMENTATION_SITE_OVERRIDES: &[(&str, &[&str])] = &[
    ("docs.rs", &[".docblock", ".item-decl"]),
    ("doc.rust-lang.org", &["#content main", ".docblock"]),
    ("developer.mozilla.org", &["article.main-page-content", ".main-page-content"]),
    ("readthedocs.", &["[role='main']", ".rst-content"]),
    ("docs.python.org", &["div.body"]),
    ("learn.microsoft.com", &["main#main", ".content"]),
    ("github.com", &[".markdown-body"]),
];

/// Generic documentation selectors, tried in order.
pub const DOCUMENTATION_SELECTORS: &[&str] = &[
    ".markdown-body",
    ".theme-doc-markdown",
    ".rst-content",
    ".documentation",
    ".docs-content",
    ".doc-content",
    "#docs-content",
    ".docs-body",
    "article.docs",
    "[class*='docs-main']",
];

/// Keywords in a URL or host that suggest numbered pagination.
pub const PAGINATION_PRONE_KEYWORDS: &[&str] = &[
    "page", "search", "category", "catalog", "list", "archive", "forum", "blog",
    "news", "products", "shop", "tag", "results", "browse", "collection",
];

/// Viewport sizes cycled through by the resize scroll pattern.
pub const VIEWPORT_SIZES: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (768, 1024), (375, 667)];

/// Finds the override selectors registered for a host, if any
pub fn overrides_for<'a>(
    table: &'a [(&'a str, &'a [&'a str])],
    host: &str,
) -> Option<&'a [&'a str]> {
    table
        .iter()
        .find(|(pattern, _)| host.contains(pattern))
        .map(|(_, selectors)| *selectors)
}
