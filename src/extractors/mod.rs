//! The extraction ensemble.
//!
//! Each [`Extractor`] encodes one assumption about where content lives. The
//! ensemble runs all of them in a fixed, declared order against a snapshot of
//! the live DOM and unions what they find into the session's
//! [`PageDocument`]. A failing or empty heuristic never affects the others.

pub mod containers;
pub mod dom;
pub mod metadata;
pub mod recipe;
pub mod site;
pub mod text_blocks;

#[cfg(test)]
mod tests;

use crate::browser::Page;
use crate::error::Result;
use crate::results::PageDocument;
pub use dom::Dom;

/// One content heuristic
pub trait Extractor: Send + Sync {
    /// Stable name used by extraction plans and logs
    fn name(&self) -> &'static str;

    /// Content fragments found by this heuristic, in document order
    fn extract(&self, dom: &Dom) -> Result<Vec<String>>;
}

/// The full battery, in run order
pub fn default_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(recipe::StructuredDataExtractor),
        Box::new(containers::ArticleExtractor),
        Box::new(containers::MainContentExtractor),
        Box::new(containers::SemanticExtractor),
        Box::new(containers::BoundedRegionExtractor),
        Box::new(containers::MultiColumnExtractor),
        Box::new(containers::SectionsExtractor),
        Box::new(containers::SingleColumnExtractor),
        Box::new(text_blocks::LargestBlockExtractor),
        Box::new(site::ProductExtractor),
        Box::new(site::DocumentationExtractor),
        Box::new(text_blocks::BasicExtractor),
        Box::new(text_blocks::TextDensityExtractor),
    ]
}

/// How the ensemble orders and trims its battery for a page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionPlan {
    /// Extractors run first, in this order
    pub priority: Vec<String>,

    /// Extractors never run
    pub skip: Vec<String>,

    /// New fragments from the priority group that end the pass early (0 = never)
    pub early_exit_threshold: usize,
}

/// Runs the extractor battery and merges results into a document
pub struct ExtractionEnsemble {
    extractors: Vec<Box<dyn Extractor>>,
    plan: ExtractionPlan,
}

impl Default for ExtractionEnsemble {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionEnsemble {
    /// Create an ensemble with the default battery and no plan
    pub fn new() -> Self {
        Self::with_extractors(default_extractors())
    }

    /// Create an ensemble over a custom battery
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self {
            extractors,
            plan: ExtractionPlan::default(),
        }
    }

    pub fn set_plan(&mut self, plan: ExtractionPlan) {
        self.plan = plan;
    }

    pub fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    /// Names of the extractors in declared order
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Extracts from the live page into `doc` and returns the number of new
    /// fragments. Never fails: a page that cannot be snapshotted adds nothing.
    pub async fn extract(&self, page: &dyn Page, doc: &mut PageDocument) -> usize {
        let html = match page.html().await {
            Ok(html) => html,
            Err(e) => {
                ::log::warn!("Could not snapshot page for extraction: {}", e);
                return 0;
            }
        };
        let url = match page.url().await {
            Ok(url) => url,
            Err(_) => doc.url.clone(),
        };

        self.extract_snapshot(&html, &url, doc)
    }

    /// Runs one extraction pass over a serialized DOM snapshot
    pub fn extract_snapshot(&self, html: &str, url: &str, doc: &mut PageDocument) -> usize {
        let dom = Dom::parse(html, url);

        if doc.title.is_none() {
            doc.set_title_if_missing(metadata::derive_title(&dom));
        }

        let (priority, rest) = self.ordered();
        let mut added = 0;

        for extractor in &priority {
            added += self.run_one(*extractor, &dom, doc);
        }

        let early_exit = !priority.is_empty()
            && self.plan.early_exit_threshold > 0
            && added >= self.plan.early_exit_threshold;

        if early_exit {
            ::log::debug!(
                "Priority extractors yielded {} new fragments, skipping the remaining {}",
                added,
                rest.len()
            );
        } else {
            for extractor in &rest {
                added += self.run_one(*extractor, &dom, doc);
            }
        }

        // Images and metadata are refreshed on every pass
        let images = metadata::extract_images(&dom);
        let new_images = images.into_iter().filter(|i| doc.push_image(i.clone())).count();
        for (key, value) in metadata::extract_metadata(&dom) {
            doc.insert_metadata(key, value);
        }

        ::log::info!(
            "Extraction pass on {} added {} fragments ({} total), {} new images",
            url,
            added,
            doc.content.len(),
            new_images
        );

        added
    }

    fn run_one(&self, extractor: &dyn Extractor, dom: &Dom, doc: &mut PageDocument) -> usize {
        match extractor.extract(dom) {
            Ok(fragments) => {
                let found = fragments.len();
                let added = doc.extend_content(fragments);
                ::log::debug!(
                    "Extractor {} found {} fragments, {} new",
                    extractor.name(),
                    found,
                    added
                );
                added
            }
            Err(e) => {
                ::log::debug!("Extractor {} failed: {}", extractor.name(), e);
                0
            }
        }
    }

    /// Splits the battery into the priority group and the rest, honouring skips
    fn ordered(&self) -> (Vec<&dyn Extractor>, Vec<&dyn Extractor>) {
        let skipped = |name: &str| self.plan.skip.iter().any(|s| s == name);

        let priority: Vec<&dyn Extractor> = self
            .plan
            .priority
            .iter()
            .filter(|name| !skipped(name.as_str()))
            .filter_map(|name| self.extractors.iter().find(|e| e.name() == name.as_str()))
            .map(|e| e.as_ref())
            .collect();

        let rest = self
            .extractors
            .iter()
            .map(|e| e.as_ref())
            .filter(|e| !skipped(e.name()))
            .filter(|e| !self.plan.priority.iter().any(|p| p == e.name()))
            .collect();

        (priority, rest)
    }
}
