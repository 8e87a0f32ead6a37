//! Page fetcher abstraction for retrieving listing markup.

use async_trait::async_trait;
use rand::Rng;

use crate::Result;

/// Delay bounds between consecutive page fetches within one query.
///
/// Sequential paging with a randomized delay is a deliberate anti-detection
/// discipline, not an accidental serial bottleneck. Fetches for *different*
/// queries may run concurrently; pages of one query must not.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    /// Minimum delay between page fetches, in milliseconds.
    pub min_delay_ms: u64,
    /// Maximum delay between page fetches, in milliseconds.
    pub max_delay_ms: u64,
}

impl PacingPolicy {
    /// Creates a pacing policy with the given delay bounds.
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms,
        }
    }

    /// Draws a randomized delay within the configured bounds.
    pub fn delay_ms(&self) -> u64 {
        if self.max_delay_ms <= self.min_delay_ms {
            return self.min_delay_ms;
        }
        rand::rng().random_range(self.min_delay_ms..=self.max_delay_ms)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min_delay_ms: 2000,
            max_delay_ms: 4000,
        }
    }
}

/// Trait for fetching the raw markup of one result page of a query.
///
/// Implementations may use plain HTTP requests or a headless browser. All
/// configuration (user-agent, timeouts, base URL) is set at construction
/// time; `fetch` is a query-and-page-in, markup-out interface. Fetches may
/// be slow and may fail transiently.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the markup for the given 1-indexed result page.
    async fn fetch(&self, query: &str, page: u32) -> Result<String>;
}
