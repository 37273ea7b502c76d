//! Scriptable in-memory [`Page`] used by the tests.

use super::{Key, Page, ScrollMetrics, Viewport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    url: String,
    pages: HashMap<String, String>,
    failing_urls: HashSet<String>,
    responses: HashMap<String, Value>,
    visible: HashSet<String>,
    counts: HashMap<String, HashMap<String, usize>>,
    click_reveals: HashMap<String, String>,
    scroll_x: f64,
    scroll_y: f64,
    scroll_height: f64,
    scroll_width: f64,
    growth_per_scroll: f64,
    max_height: f64,
    viewport: Viewport,
    gotos: Vec<String>,
    clicks: Vec<String>,
    keys: Vec<Key>,
    scroll_calls: usize,
    bottom_scrolls: usize,
    viewports: Vec<Viewport>,
    positions: Vec<(f64, f64)>,
    scrolled_into_view: Vec<String>,
    failing_viewport_width: Option<u32>,
    fail_html: bool,
}

pub struct MockPage {
    state: Mutex<State>,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1280,
            height: 800,
        }
    }
}

impl MockPage {
    pub fn new(url: &str, html: &str) -> Self {
        let mut pages = HashMap::new();
        pages.insert(url.to_string(), html.to_string());
        Self {
            state: Mutex::new(State {
                url: url.to_string(),
                pages,
                scroll_height: 2000.0,
                scroll_width: 1280.0,
                max_height: 2000.0,
                viewport: Viewport::default(),
                ..State::default()
            }),
        }
    }

    fn with(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Registers the HTML served after navigating to `url`
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with(|s| {
            s.pages.insert(url.to_string(), html.to_string());
        })
    }

    pub fn with_height(self, height: f64) -> Self {
        self.with(|s| {
            s.scroll_height = height;
            s.max_height = height;
        })
    }

    /// Every scroll grows the document by `step` until it reaches `max`
    pub fn with_growth(self, step: f64, max: f64) -> Self {
        self.with(|s| {
            s.growth_per_scroll = step;
            s.max_height = max;
        })
    }

    pub fn with_visible(self, selector: &str) -> Self {
        self.with(|s| {
            s.visible.insert(selector.to_string());
        })
    }

    /// Number of matches for `selector` once the page is at `url`
    pub fn with_count(self, url: &str, selector: &str, count: usize) -> Self {
        self.with(|s| {
            s.counts
                .entry(url.to_string())
                .or_default()
                .insert(selector.to_string(), count);
        })
    }

    pub fn with_response(self, script: &str, value: Value) -> Self {
        self.with(|s| {
            s.responses.insert(script.to_string(), value);
        })
    }

    /// Clicking `selector` appends `fragment` to the current page body
    pub fn with_click_reveal(self, selector: &str, fragment: &str) -> Self {
        self.with(|s| {
            s.click_reveals
                .insert(selector.to_string(), fragment.to_string());
        })
    }

    pub fn with_failing_navigation(self, url: &str) -> Self {
        self.with(|s| {
            s.failing_urls.insert(url.to_string());
        })
    }

    pub fn with_failing_html(self) -> Self {
        self.with(|s| s.fail_html = true)
    }

    /// Resizing the window to `width` fails
    pub fn with_failing_viewport(self, width: u32) -> Self {
        self.with(|s| s.failing_viewport_width = Some(width))
    }

    pub fn gotos(&self) -> Vec<String> {
        self.state.lock().unwrap().gotos.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn keys(&self) -> Vec<Key> {
        self.state.lock().unwrap().keys.clone()
    }

    pub fn scroll_calls(&self) -> usize {
        self.state.lock().unwrap().scroll_calls
    }

    pub fn bottom_scrolls(&self) -> usize {
        self.state.lock().unwrap().bottom_scrolls
    }

    pub fn scroll_y(&self) -> f64 {
        self.state.lock().unwrap().scroll_y
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.state.lock().unwrap().viewports.clone()
    }

    /// Every `(x, y)` passed to `scroll_to`, in order
    pub fn scroll_positions(&self) -> Vec<(f64, f64)> {
        self.state.lock().unwrap().positions.clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<String> {
        self.state.lock().unwrap().scrolled_into_view.clone()
    }
}

#[async_trait]
impl Page for MockPage {
    async fn url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn html(&self) -> Result<String> {
        let s = self.state.lock().unwrap();
        if s.fail_html {
            return Err(Error::Evaluation("page crashed".to_string()));
        }
        Ok(s.pages.get(&s.url).cloned().unwrap_or_default())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let s = self.state.lock().unwrap();
        s.responses
            .get(script)
            .cloned()
            .ok_or_else(|| Error::Evaluation("no scripted response".to_string()))
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        s.gotos.push(url.to_string());
        if s.failing_urls.contains(url) {
            return Err(Error::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        s.url = url.to_string();
        s.scroll_y = 0.0;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        let s = self.state.lock().unwrap();
        let html = s.pages.get(&s.url).cloned().unwrap_or_default();
        let document = scraper::Html::parse_document(&html);
        let parsed = scraper::Selector::parse(selector).map_err(|e| Error::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })?;
        Ok(document.select(&parsed).next().is_some())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let s = self.state.lock().unwrap();
        Ok(ScrollMetrics {
            scroll_x: s.scroll_x,
            scroll_y: s.scroll_y,
            scroll_height: s.scroll_height,
            scroll_width: s.scroll_width,
            viewport_width: s.viewport.width as f64,
            viewport_height: s.viewport.height as f64,
        })
    }

    async fn scroll_to(&self, x: f64, y: f64) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        s.scroll_calls += 1;
        s.positions.push((x, y));
        if y >= s.scroll_height - s.viewport.height as f64 {
            s.bottom_scrolls += 1;
        }
        s.scroll_x = x.max(0.0);
        s.scroll_y = y.clamp(0.0, s.scroll_height);
        if s.growth_per_scroll > 0.0 && s.scroll_height < s.max_height {
            s.scroll_height = (s.scroll_height + s.growth_per_scroll).min(s.max_height);
        }
        Ok(())
    }

    async fn viewport(&self) -> Result<Viewport> {
        Ok(self.state.lock().unwrap().viewport)
    }

    async fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        if s.failing_viewport_width == Some(viewport.width) {
            return Err(Error::WebDriver("window resize rejected".to_string()));
        }
        s.viewport = viewport;
        s.viewports.push(viewport);
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        s.scrolled_into_view.push(selector.to_string());
        Ok(s.visible.contains(selector))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().visible.contains(selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        if !s.visible.contains(selector) {
            return Err(Error::SelectorNotFound(selector.to_string()));
        }
        s.clicks.push(selector.to_string());
        if let Some(fragment) = s.click_reveals.get(selector) {
            // Each click reveals a new, numbered copy of the fragment
            let revealed = fragment.replace("{n}", &s.clicks.len().to_string());
            let page = s.pages.entry(s.url.clone()).or_default();
            match page.rfind("</body>") {
                Some(index) => page.insert_str(index, &revealed),
                None => page.push_str(&revealed),
            }
        }
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let s = self.state.lock().unwrap();
        Ok(s.counts
            .get(&s.url)
            .and_then(|counts| counts.get(selector))
            .copied()
            .unwrap_or(0))
    }

    async fn press_key(&self, key: Key) -> Result<()> {
        let mut guard = self.state.lock().unwrap();
        let s = &mut *guard;
        s.keys.push(key);
        let step = s.viewport.height as f64;
        s.scroll_y = (s.scroll_y + step).min(s.scroll_height);
        Ok(())
    }

    async fn dispatch_hover(&self) -> Result<usize> {
        Ok(0)
    }
}
