use super::{scroll_until_stable, PaginationStrategy};
use crate::browser::{Key, Page, Viewport};
use crate::catalog::VIEWPORT_SIZES;
use crate::error::Result;
use crate::utils::pause;
use async_trait::async_trait;
use rand::Rng;

/// Consecutive unchanged heights that end a bottom-scroll pass
const STABLE_TOLERANCE: usize = 3;

/// Movement patterns, run in this order. Sites trigger lazy loading on
/// different signals (scroll events, resizes, observers, mouse movement),
/// so every pattern runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPattern {
    Standard,
    PercentageChunks,
    ReverseTopWalk,
    Pulse,
    Zigzag,
    SmallSteps,
    Bounce,
    Hover,
    RandomPositions,
    FourCorners,
    Diagonal,
    Spiral,
    Keyboard,
    ViewportResize,
    FinalPass,
}

impl ScrollPattern {
    pub const SEQUENCE: [ScrollPattern; 15] = [
        ScrollPattern::Standard,
        ScrollPattern::PercentageChunks,
        ScrollPattern::ReverseTopWalk,
        ScrollPattern::Pulse,
        ScrollPattern::Zigzag,
        ScrollPattern::SmallSteps,
        ScrollPattern::Bounce,
        ScrollPattern::Hover,
        ScrollPattern::RandomPositions,
        ScrollPattern::FourCorners,
        ScrollPattern::Diagonal,
        ScrollPattern::Spiral,
        ScrollPattern::Keyboard,
        ScrollPattern::ViewportResize,
        ScrollPattern::FinalPass,
    ];
}

/// Runs every scroll pattern once, one pattern per step
pub struct ScrollStrategy {
    max_scrolls: usize,
    delay_ms: u64,
    next: usize,
    heights: Vec<f64>,
}

impl ScrollStrategy {
    pub fn new(max_scrolls: usize, delay_ms: u64) -> Self {
        Self {
            max_scrolls,
            delay_ms,
            next: 0,
            heights: Vec::new(),
        }
    }

    /// Document heights recorded after each pattern
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Delay used between the small movements inside a pattern
    fn step_delay(&self) -> u64 {
        self.delay_ms / 4
    }

    /// Step count for patterns that walk the page
    fn steps(&self) -> usize {
        self.max_scrolls.clamp(1, 10)
    }

    async fn run_pattern(&self, page: &dyn Page, pattern: ScrollPattern) -> Result<()> {
        let metrics = page.scroll_metrics().await?;
        let height = metrics.scroll_height;
        let width = metrics.scroll_width.max(metrics.viewport_width);
        let step_delay = self.step_delay();

        match pattern {
            ScrollPattern::Standard | ScrollPattern::FinalPass => {
                let attempts =
                    scroll_until_stable(page, self.max_scrolls, self.delay_ms, STABLE_TOLERANCE)
                        .await?;
                ::log::debug!("Bottom scroll pass made {} attempts", attempts);
            }
            ScrollPattern::PercentageChunks => {
                for percent in (10..=100).step_by(10) {
                    page.scroll_to(0.0, height * percent as f64 / 100.0).await?;
                    pause(step_delay).await;
                }
            }
            ScrollPattern::ReverseTopWalk => {
                let step = metrics.viewport_height.max(1.0);
                let mut y = height;
                for _ in 0..self.steps() {
                    page.scroll_to(0.0, y).await?;
                    pause(step_delay).await;
                    if y <= 0.0 {
                        break;
                    }
                    y = (y - step).max(0.0);
                }
            }
            ScrollPattern::Pulse => {
                for _ in 0..self.steps().min(5) {
                    let current = page.scroll_metrics().await?.scroll_height;
                    page.scroll_to(0.0, current).await?;
                    pause(self.delay_ms).await;
                    page.scroll_to(0.0, current * 0.9).await?;
                    pause(step_delay).await;
                }
            }
            ScrollPattern::Zigzag => {
                let step = (metrics.viewport_height / 2.0).max(1.0);
                let mut y = 0.0;
                let mut left = true;
                for _ in 0..self.steps() * 4 {
                    if y > height {
                        break;
                    }
                    let x = if left { 0.0 } else { 100.0_f64.min(width) };
                    page.scroll_to(x, y).await?;
                    pause(step_delay).await;
                    y += step;
                    left = !left;
                }
                page.scroll_to(0.0, metrics.scroll_y).await?;
            }
            ScrollPattern::SmallSteps => {
                let mut y = metrics.scroll_y;
                for _ in 0..self.steps() * 3 {
                    y += 200.0;
                    page.scroll_to(0.0, y).await?;
                    pause(step_delay).await;
                    if y >= height {
                        break;
                    }
                }
            }
            ScrollPattern::Bounce => {
                for _ in 0..3 {
                    page.scroll_to(0.0, 0.0).await?;
                    pause(step_delay).await;
                    let current = page.scroll_metrics().await?.scroll_height;
                    page.scroll_to(0.0, current).await?;
                    pause(self.delay_ms).await;
                }
            }
            ScrollPattern::Hover => {
                let hovered = page.dispatch_hover().await?;
                ::log::debug!("Dispatched hover events to {} elements", hovered);
                pause(self.delay_ms).await;
            }
            ScrollPattern::RandomPositions => {
                // Sample every position before the first await
                let positions: Vec<f64> = {
                    let mut rng = rand::rng();
                    (0..self.steps().min(5))
                        .map(|_| rng.random_range(0.0..height.max(1.0)))
                        .collect()
                };
                for y in positions {
                    page.scroll_to(0.0, y).await?;
                    pause(step_delay).await;
                }
            }
            ScrollPattern::FourCorners => {
                for (x, y) in [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)] {
                    page.scroll_to(x, y).await?;
                    pause(step_delay).await;
                }
                page.scroll_to(0.0, height).await?;
            }
            ScrollPattern::Diagonal => {
                let steps = self.steps();
                for i in 0..=steps {
                    let t = i as f64 / steps as f64;
                    page.scroll_to(width * t, height * t).await?;
                    pause(step_delay).await;
                }
            }
            ScrollPattern::Spiral => {
                let (cx, cy) = (width / 2.0, height / 2.0);
                let points = 12;
                for i in 0..points {
                    let angle = i as f64 * std::f64::consts::FRAC_PI_3;
                    let radius = (i + 1) as f64 / points as f64;
                    let x = (cx + angle.cos() * cx * radius).clamp(0.0, width);
                    let y = (cy + angle.sin() * cy * radius).clamp(0.0, height);
                    page.scroll_to(x, y).await?;
                    pause(step_delay).await;
                }
            }
            ScrollPattern::Keyboard => {
                for _ in 0..self.steps() {
                    page.press_key(Key::PageDown).await?;
                    pause(step_delay).await;
                }
                page.press_key(Key::End).await?;
                pause(self.delay_ms).await;
            }
            ScrollPattern::ViewportResize => {
                let original = page.viewport().await?;
                let resized = self.resize_and_rescroll(page).await;
                // Restored even when a resize step failed
                page.set_viewport(original).await?;
                resized?;
            }
        }

        Ok(())
    }

    async fn resize_and_rescroll(&self, page: &dyn Page) -> Result<()> {
        for &(w, h) in VIEWPORT_SIZES {
            page.set_viewport(Viewport { width: w, height: h }).await?;
            pause(self.step_delay()).await;
            let current = page.scroll_metrics().await?.scroll_height;
            page.scroll_to(0.0, current).await?;
            pause(self.step_delay()).await;
        }
        Ok(())
    }
}

#[async_trait]
impl PaginationStrategy for ScrollStrategy {
    fn name(&self) -> &'static str {
        "scroll"
    }

    async fn initialize(&mut self, page: &dyn Page) -> bool {
        match page.scroll_metrics().await {
            Ok(metrics) => {
                self.next = 0;
                self.heights = vec![metrics.scroll_height];
                true
            }
            Err(e) => {
                ::log::warn!("Scroll pagination unavailable: {}", e);
                false
            }
        }
    }

    async fn advance(&mut self, page: &dyn Page) -> bool {
        let Some(&pattern) = ScrollPattern::SEQUENCE.get(self.next) else {
            return false;
        };
        self.next += 1;

        if let Err(e) = self.run_pattern(page, pattern).await {
            ::log::debug!("Scroll pattern {:?} failed: {}", pattern, e);
        }

        if let Ok(metrics) = page.scroll_metrics().await {
            self.heights.push(metrics.scroll_height);
            ::log::debug!(
                "Scroll pattern {:?} done, height {}",
                pattern,
                metrics.scroll_height
            );
        }
        true
    }
}
