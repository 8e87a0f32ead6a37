//! Query orchestration: cache check, paged scrape, normalize, persist.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::extract::Extractor;
use crate::fetcher::{PacingPolicy, PageFetcher};
use crate::normalize::Normalizer;
use crate::relevance::is_relevant;
use crate::{Config, Product, QueryResult, RawCandidate, Result, ScrapeError};

/// Read-time view parameters applied to a result set. These are not part of
/// what gets cached; the same cached data serves any limit/min_rating
/// combination.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Maximum number of products returned (1–100).
    pub limit: usize,
    /// Minimum rating; products below it (or unrated, when > 0) are dropped.
    pub min_rating: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            min_rating: 0.0,
        }
    }
}

impl SearchOptions {
    /// Validates the view parameters.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.limit) {
            return Err(ScrapeError::InvalidParameter(
                "limit must be between 1 and 100".to_string(),
            ));
        }
        if !(0.0..=5.0).contains(&self.min_rating) {
            return Err(ScrapeError::InvalidParameter(
                "min_rating must be between 0 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validates a search query string.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().chars().count() < 2 {
        return Err(ScrapeError::InvalidQuery(
            "query must be at least 2 characters".to_string(),
        ));
    }
    Ok(())
}

/// Orchestrates the fetch → extract → filter → normalize → cache pipeline
/// for incoming search requests.
///
/// One `Searcher` serves all queries; invocations for distinct queries may
/// run concurrently and share only the cache store. Configuration is read
/// once at construction.
pub struct Searcher {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn CacheStore>,
    extractor: Extractor,
    normalizer: Normalizer,
    pacing: PacingPolicy,
    max_pages: u32,
    fetch_timeout: Duration,
}

impl Searcher {
    /// Creates a searcher over the given fetcher and cache store.
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            fetcher,
            cache,
            extractor: Extractor::new(&config.base_url),
            normalizer: Normalizer::new(&config.platform),
            pacing: PacingPolicy::new(config.min_delay_ms, config.max_delay_ms),
            max_pages: config.max_pages,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Serves one search request.
    ///
    /// Cache hit: the stored result is returned with the view parameters
    /// applied. Miss (or expired entry, or cache read failure): the source
    /// is scraped page by page, the normalized set is written back to the
    /// cache, and the fresh result is returned.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<QueryResult> {
        validate_query(query)?;
        options.validate()?;

        match self.cache.get(query).await {
            Ok(Some(result)) => {
                info!(query, count = result.count(), "serving cached result");
                return Ok(apply_view(result, &options, true));
            }
            Ok(None) => debug!(query, "cache miss"),
            Err(e) => warn!(query, error = %e, "cache read failed, falling back to scrape"),
        }

        let candidates = self.scrape(query).await?;
        let products = self.normalizer.normalize(candidates);
        info!(query, count = products.len(), "scrape complete");

        // A failed write must not discard the freshly computed result; the
        // caller still gets it, minus durability.
        if let Err(e) = self.cache.put(query, &products).await {
            warn!(query, error = %e, "cache write failed, serving uncached result");
        }

        Ok(apply_view(QueryResult::new(query, products), &options, false))
    }

    /// Fetches up to `max_pages` sequentially, keeping each page's relevant
    /// candidates.
    ///
    /// A failed or timed-out fetch skips that page only; later pages are
    /// still attempted. A successfully fetched page with no listings ends
    /// pagination (end of results). Zero fetched pages is a total failure,
    /// distinct from "no relevant products".
    async fn scrape(&self, query: &str) -> Result<Vec<RawCandidate>> {
        let mut relevant = Vec::new();
        let mut pages_fetched = 0u32;

        for page in 1..=self.max_pages {
            if page > 1 {
                let delay = self.pacing.delay_ms();
                debug!(page, delay_ms = delay, "pacing before next page");
                sleep(Duration::from_millis(delay)).await;
            }

            let html = match timeout(self.fetch_timeout, self.fetcher.fetch(query, page)).await {
                Ok(Ok(html)) => html,
                Ok(Err(e)) => {
                    warn!(page, error = %e, "page fetch failed, skipping");
                    continue;
                }
                Err(_) => {
                    warn!(page, "page fetch timed out, skipping");
                    continue;
                }
            };
            pages_fetched += 1;

            let candidates = self.extractor.extract(&html, page);
            if candidates.is_empty() {
                debug!(page, "no listings on page, ending pagination");
                break;
            }

            let before = relevant.len();
            relevant.extend(
                candidates
                    .into_iter()
                    .filter(|c| is_relevant(&c.title, query)),
            );
            debug!(page, kept = relevant.len() - before, "relevance filter applied");
        }

        if pages_fetched == 0 {
            return Err(ScrapeError::TotalFetchFailure(self.max_pages));
        }

        Ok(relevant)
    }
}

/// Applies the read-time view (min_rating, then limit) to a result set.
fn apply_view(result: QueryResult, options: &SearchOptions, cached: bool) -> QueryResult {
    let products: Vec<Product> = result
        .products
        .into_iter()
        .filter(|p| {
            options.min_rating <= 0.0 || p.rating.is_some_and(|r| r >= options.min_rating)
        })
        .take(options.limit)
        .collect();

    QueryResult {
        query: result.query,
        products,
        created_at: result.created_at,
        cached,
    }
}
