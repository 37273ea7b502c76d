use crate::browser::{scripts, Page};
use crate::error::Result;
use crate::utils::pause;
use serde::{Deserialize, Serialize};

/// Confidence above which infinite scrolling counts as detected
pub const DETECTION_THRESHOLD: u8 = 3;

/// Raw signals gathered by the probe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfiniteScrollSignals {
    #[serde(default)]
    pub height_increase: f64,
    #[serde(default)]
    pub loading_indicators: bool,
    #[serde(default)]
    pub lazy_images: usize,
    #[serde(default)]
    pub sentinels: bool,
    #[serde(default)]
    pub intersection_observer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfiniteScrollReport {
    pub detected: bool,
    /// Additive score in `0..=10`
    pub confidence: u8,
    pub signals: InfiniteScrollSignals,
}

impl From<InfiniteScrollSignals> for InfiniteScrollReport {
    fn from(signals: InfiniteScrollSignals) -> Self {
        let confidence = confidence(&signals);
        InfiniteScrollReport {
            detected: confidence > DETECTION_THRESHOLD,
            confidence,
            signals,
        }
    }
}

/// +3 height grew by more than 100px, +2 loading indicators, +2 more than
/// five lazy images, +3 sentinels, +1 IntersectionObserver support
pub fn confidence(signals: &InfiniteScrollSignals) -> u8 {
    let mut score: u8 = 0;
    if signals.height_increase > 100.0 {
        score += 3;
    }
    if signals.loading_indicators {
        score += 2;
    }
    if signals.lazy_images > 5 {
        score += 2;
    }
    if signals.sentinels {
        score += 3;
    }
    if signals.intersection_observer {
        score += 1;
    }
    score.min(10)
}

/// Probes the page for infinite scrolling.
///
/// Scrolls to 20% and then 40% of the page height, waiting `settle_ms`
/// after each, and leaves the page there. Callers that need the original
/// position must restore it.
pub async fn detect_infinite_scroll(page: &dyn Page, settle_ms: u64) -> Result<InfiniteScrollReport> {
    let before = page.scroll_metrics().await?;

    for fraction in [0.2, 0.4] {
        let current = page.scroll_metrics().await?;
        page.scroll_to(before.scroll_x, current.scroll_height * fraction).await?;
        pause(settle_ms).await;
    }

    let after = page.scroll_metrics().await?;

    let mut signals = match page.evaluate(scripts::INFINITE_SCROLL_PROBE).await {
        Ok(value) => serde_json::from_value::<InfiniteScrollSignals>(value).unwrap_or_else(|e| {
            ::log::debug!("Unexpected infinite scroll probe result: {}", e);
            InfiniteScrollSignals::default()
        }),
        Err(e) => {
            ::log::debug!("Infinite scroll probe failed: {}", e);
            InfiniteScrollSignals::default()
        }
    };
    signals.height_increase = (after.scroll_height - before.scroll_height).max(0.0);

    let report = InfiniteScrollReport::from(signals);
    ::log::debug!(
        "Infinite scroll confidence {} (detected: {})",
        report.confidence,
        report.detected
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::MockPage;
    use serde_json::json;

    #[test]
    fn test_confidence_bounds_and_threshold() {
        for bits in 0..32u32 {
            let signals = InfiniteScrollSignals {
                height_increase: if bits & 1 != 0 { 500.0 } else { 0.0 },
                loading_indicators: bits & 2 != 0,
                lazy_images: if bits & 4 != 0 { 12 } else { 0 },
                sentinels: bits & 8 != 0,
                intersection_observer: bits & 16 != 0,
            };
            let report = InfiniteScrollReport::from(signals);
            assert!(report.confidence <= 10);
            assert_eq!(report.detected, report.confidence > 3);
        }
    }

    #[test]
    fn test_confidence_edges() {
        let observer_only = InfiniteScrollSignals {
            intersection_observer: true,
            height_increase: 100.0,
            lazy_images: 5,
            ..Default::default()
        };
        assert_eq!(confidence(&observer_only), 1);

        let growth_and_observer = InfiniteScrollSignals {
            height_increase: 101.0,
            intersection_observer: true,
            ..Default::default()
        };
        let report = InfiniteScrollReport::from(growth_and_observer);
        assert_eq!(report.confidence, 4);
        assert!(report.detected);
    }

    #[tokio::test]
    async fn test_probe_scrolls_to_twenty_and_forty_percent() {
        let page = MockPage::new("https://example.com", "<p></p>")
            .with_height(5000.0)
            .with_growth(400.0, 10_000.0)
            .with_response(
                scripts::INFINITE_SCROLL_PROBE,
                json!({"loadingIndicators": true, "lazyImages": 2, "sentinels": false, "intersectionObserver": true}),
            );

        let report = detect_infinite_scroll(&page, 0).await.unwrap();
        assert_eq!(page.scroll_calls(), 2);
        // 40% of the grown height (5400)
        assert_eq!(page.scroll_y(), 2160.0);
        assert_eq!(report.signals.height_increase, 800.0);
        assert_eq!(report.confidence, 6);
        assert!(report.detected);
    }

    #[tokio::test]
    async fn test_probe_failure_is_no_signal() {
        let page = MockPage::new("https://example.com", "<p></p>");
        let report = detect_infinite_scroll(&page, 0).await.unwrap();
        assert_eq!(report.confidence, 0);
        assert!(!report.detected);
    }
}
