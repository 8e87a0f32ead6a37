//! # dealscope
//!
//! An e-commerce listing ingestion pipeline: scrape result pages, extract
//! structured records, filter out accessory noise, deduplicate, cache to a
//! durable file store, and serve through a query API.
//!
//! The pipeline is fetch → extract → filter → normalize → cache → serve,
//! coordinated per request by [`Searcher`]:
//!
//! - Cache hits are served directly, with `limit`/`min_rating` applied as
//!   read-time views over the stored set.
//! - Misses drive a sequential, rate-paced multi-page scrape; a page that
//!   fails to fetch is skipped, and only a total fetch failure surfaces as
//!   an error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use dealscope::{Config, FileCache, HttpFetcher, SearchOptions, Searcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let fetcher = Arc::new(HttpFetcher::new(
//!         &config.base_url,
//!         &config.user_agent,
//!         Duration::from_secs(config.fetch_timeout_secs),
//!     ));
//!     let cache = Arc::new(FileCache::new(&config.cache_dir, config.cache_ttl_hours));
//!     let searcher = Searcher::new(&config, fetcher, cache);
//!
//!     let result = searcher
//!         .search("sony headphones", SearchOptions::default())
//!         .await?;
//!     for product in &result.products {
//!         println!("{}: {:?}", product.title, product.price);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod product;

pub mod api;
pub mod cache;
pub mod extract;
pub mod fetcher;
pub mod fetcher_http;
pub mod normalize;
pub mod relevance;
pub mod search;

pub use cache::{query_key, CacheStore, FileCache};
pub use config::Config;
pub use error::{Result, ScrapeError};
pub use fetcher::{PacingPolicy, PageFetcher};
pub use fetcher_http::HttpFetcher;
pub use product::{normalized_title, Product, QueryResult, RawCandidate};
pub use search::{SearchOptions, Searcher};
