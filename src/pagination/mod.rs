//! Strategies that surface content hidden behind scrolling, clicks or
//! further pages.
//!
//! A strategy owns its cursor (height history, page number, click count)
//! and is driven by the orchestrator: `initialize` once, then `advance`
//! until it returns `false`, with an extraction pass after every step.
//! Strategies swallow page errors; a failed step simply ends the strategy.

pub mod click;
pub mod scroll;
pub mod url_param;
pub mod url_path;

use crate::browser::Page;
use crate::error::Result;
use crate::utils::pause;
use async_trait::async_trait;

pub use click::ClickStrategy;
pub use scroll::ScrollStrategy;
pub use url_param::UrlParameterStrategy;
pub use url_path::UrlPathStrategy;

#[async_trait]
pub trait PaginationStrategy: Send {
    /// Name used in logs and stage reports
    fn name(&self) -> &'static str;

    /// Prepares the strategy; `false` means it cannot run on this page
    async fn initialize(&mut self, page: &dyn Page) -> bool;

    /// Performs one step; `false` means the strategy is finished
    async fn advance(&mut self, page: &dyn Page) -> bool;
}

/// Scrolls to the bottom until the document height stops changing.
///
/// Stops after `tolerance` consecutive attempts without growth, or when
/// `max_attempts` is spent, and returns the number of attempts made.
pub async fn scroll_until_stable(
    page: &dyn Page,
    max_attempts: usize,
    delay_ms: u64,
    tolerance: usize,
) -> Result<usize> {
    let mut height = page.scroll_metrics().await?.scroll_height;
    let mut unchanged = 0;
    let mut attempts = 0;

    while attempts < max_attempts {
        page.scroll_to(0.0, height).await?;
        pause(delay_ms).await;
        attempts += 1;

        let new_height = page.scroll_metrics().await?.scroll_height;
        if new_height > height {
            ::log::trace!("Height grew {} -> {}", height, new_height);
            height = new_height;
            unchanged = 0;
        } else {
            unchanged += 1;
            if unchanged >= tolerance {
                break;
            }
        }
    }

    Ok(attempts)
}
