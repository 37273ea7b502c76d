use crate::utils::{dedup_key, strip_ordinal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An image discovered on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Absolute URL of the image
    pub url: String,

    /// Alternative text (if any)
    pub alt: Option<String>,

    /// Declared width in pixels (if any)
    pub width: Option<u32>,

    /// Declared height in pixels (if any)
    pub height: Option<u32>,
}

/// The accumulated scrape result for one page.
///
/// Content only ever grows: fragments are appended in discovery order and a
/// fragment whose [`dedup_key`] has been seen before is dropped. A bare
/// fragment is also dropped when a numbered copy of it ("1. Mix well") is
/// already present, so DOM text never repeats a numbered step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageDocument {
    /// URL the session started on
    pub url: String,

    /// Title of the page (if one was found)
    pub title: Option<String>,

    /// Ordered, unique content fragments
    pub content: Vec<String>,

    /// Images discovered so far, unique by URL
    pub images: Vec<ImageData>,

    /// Meta tags, canonical/language and JSON-LD blocks
    pub metadata: BTreeMap<String, String>,

    #[serde(skip)]
    seen_content: HashSet<String>,

    /// Keys of numbered fragments with the ordinal removed
    #[serde(skip)]
    seen_steps: HashSet<String>,

    #[serde(skip)]
    seen_images: HashSet<String>,
}

impl PageDocument {
    /// Create an empty document for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Appends a fragment unless it is empty or already present.
    ///
    /// Returns `true` when the fragment was new.
    pub fn push_content(&mut self, fragment: &str) -> bool {
        let key = dedup_key(fragment);
        if key.is_empty() || self.contains_key(&key) {
            return false;
        }
        if let Some(step) = strip_ordinal(&key) {
            self.seen_steps.insert(step.to_string());
        }
        self.seen_content.insert(key);
        self.content.push(fragment.trim().to_string());
        true
    }

    /// Appends fragments in order and returns how many were new
    pub fn extend_content<I, S>(&mut self, fragments: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fragments
            .into_iter()
            .filter(|fragment| self.push_content(fragment.as_ref()))
            .count()
    }

    /// Whether a fragment with the same dedup key is already present
    pub fn contains(&self, fragment: &str) -> bool {
        self.contains_key(&dedup_key(fragment))
    }

    fn contains_key(&self, key: &str) -> bool {
        self.seen_content.contains(key) || self.seen_steps.contains(key)
    }

    /// Adds an image unless its URL was already recorded
    pub fn push_image(&mut self, image: ImageData) -> bool {
        if !self.seen_images.insert(image.url.clone()) {
            return false;
        }
        self.images.push(image);
        true
    }

    /// Records a metadata entry; the first value for a key is kept
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Sets the title only if none has been found yet
    pub fn set_title_if_missing(&mut self, title: Option<String>) {
        if self.title.is_none() {
            self.title = title.filter(|t| !t.trim().is_empty());
        }
    }
}
