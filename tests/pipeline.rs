//! End-to-end pipeline tests: scripted pages through the full
//! fetch → extract → filter → normalize → cache → serve flow.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use dealscope::{
    CacheStore, Config, FileCache, PageFetcher, Result, ScrapeError, SearchOptions, Searcher,
};

/// Serves a fixed markup string for page 1 and an empty document beyond.
struct OnePageFetcher {
    html: String,
}

#[async_trait]
impl PageFetcher for OnePageFetcher {
    async fn fetch(&self, _query: &str, page: u32) -> Result<String> {
        if page == 1 {
            Ok(self.html.clone())
        } else {
            Ok("<html><body></body></html>".to_string())
        }
    }
}

/// Always fails, as if the source were unreachable.
struct DownFetcher;

#[async_trait]
impl PageFetcher for DownFetcher {
    async fn fetch(&self, _query: &str, page: u32) -> Result<String> {
        Err(ScrapeError::Fetch {
            page,
            reason: "connect timeout".to_string(),
        })
    }
}

const SONY_PAGE: &str = r#"
<html><body>
<div data-component-type="s-search-result">
  <h2><a href="/dp/B09XSQH1QH"><span class="a-text-normal">Sony WH-1000XM5 Wireless Headphones</span></a></h2>
  <span class="a-price"><span class="a-offscreen">₹29,990</span><span class="a-price-whole">29,990</span></span>
  <span aria-label="4.5 out of 5 stars">4.5 out of 5 stars</span>
  <img class="s-image" alt="Sony WH-1000XM5 Wireless Headphones" src="img.jpg">
</div>
<div data-component-type="s-search-result">
  <h2><a href="/dp/B0CABLE11"><span class="a-text-normal">USB Cable Compatible with Sony Headphones</span></a></h2>
  <span class="a-price"><span class="a-price-whole">299</span></span>
  <span aria-label="4.1 out of 5 stars">4.1 out of 5 stars</span>
</div>
<div data-component-type="s-search-result">
  <h2><a href="/dp/B09XSQH1QH"><span class="a-text-normal">Sony WH-1000XM5 Wireless Headphones</span></a></h2>
  <span class="a-price"><span class="a-price-whole">29,990</span></span>
  <span aria-label="4.5 out of 5 stars">4.5 out of 5 stars</span>
</div>
</body></html>
"#;

fn test_config() -> Config {
    Config {
        max_pages: 1,
        min_delay_ms: 0,
        max_delay_ms: 0,
        ..Config::default()
    }
}

fn searcher(fetcher: Arc<dyn PageFetcher>, dir: &TempDir, config: &Config) -> Searcher {
    let cache = Arc::new(FileCache::new(dir.path(), config.cache_ttl_hours));
    Searcher::new(config, fetcher, cache)
}

#[tokio::test]
async fn scrape_filters_accessories_and_duplicates() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let searcher = searcher(
        Arc::new(OnePageFetcher {
            html: SONY_PAGE.to_string(),
        }),
        &dir,
        &config,
    );

    let result = searcher
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.count(), 1);
    assert!(!result.cached);

    let product = &result.products[0];
    assert_eq!(product.title, "Sony WH-1000XM5 Wireless Headphones");
    assert_eq!(product.price, Some(29990.0));
    assert_eq!(product.rating, Some(4.5));
    assert_eq!(product.url, "https://www.amazon.in/dp/B09XSQH1QH");
    assert_eq!(product.platform, "Amazon");
}

#[tokio::test]
async fn repeated_query_hits_the_cache() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let searcher = searcher(
        Arc::new(OnePageFetcher {
            html: SONY_PAGE.to_string(),
        }),
        &dir,
        &config,
    );

    let fresh = searcher
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap();
    let cached = searcher
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap();

    assert!(!fresh.cached);
    assert!(cached.cached);
    assert_eq!(cached.count(), fresh.count());
    assert_eq!(cached.products[0].title, fresh.products[0].title);
}

#[tokio::test]
async fn unreachable_source_is_a_distinct_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let searcher = searcher(Arc::new(DownFetcher), &dir, &config);

    let err = searcher
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::TotalFetchFailure(_)));

    // Nothing was cached by the failed request.
    let cache = FileCache::new(dir.path(), config.cache_ttl_hours);
    assert!(cache.get("sony headphones").await.unwrap().is_none());
}

#[tokio::test]
async fn empty_page_yields_empty_result_not_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let searcher = searcher(
        Arc::new(OnePageFetcher {
            html: "<html><body><p>No results found.</p></body></html>".to_string(),
        }),
        &dir,
        &config,
    );

    let result = searcher
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(result.count(), 0);
}

#[tokio::test]
async fn cached_entries_are_isolated_per_query() {
    let dir = TempDir::new().unwrap();
    let config = test_config();

    let sony = searcher(
        Arc::new(OnePageFetcher {
            html: SONY_PAGE.to_string(),
        }),
        &dir,
        &config,
    );
    sony.search("sony headphones", SearchOptions::default())
        .await
        .unwrap();

    // A different query does not see sony's entry and scrapes on its own.
    let empty = searcher(
        Arc::new(OnePageFetcher {
            html: "<html><body></body></html>".to_string(),
        }),
        &dir,
        &config,
    );
    let result = empty
        .search("apple iphone", SearchOptions::default())
        .await
        .unwrap();
    assert!(!result.cached);
    assert_eq!(result.count(), 0);

    // And sony's entry is still intact.
    let again = sony
        .search("sony headphones", SearchOptions::default())
        .await
        .unwrap();
    assert!(again.cached);
    assert_eq!(again.count(), 1);
}
