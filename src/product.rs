//! Product record types for the scraping pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw listing pulled from one page of markup.
///
/// Produced by the record extractor before any validation; fields may be
/// missing or malformed. Candidates that survive the relevance filter are
/// turned into [`Product`]s by the normalizer.
#[derive(Debug, Clone, Default)]
pub struct RawCandidate {
    /// Listing title text.
    pub title: String,
    /// Price text as it appeared in the markup (e.g. "₹29,990").
    pub price_text: Option<String>,
    /// Rating text as it appeared in the markup (e.g. "4.5 out of 5 stars").
    pub rating_text: Option<String>,
    /// Listing URL, possibly empty if the card had no link.
    pub url: String,
    /// 1-indexed result page the listing was found on.
    pub source_page: u32,
}

impl RawCandidate {
    /// Creates a new raw candidate.
    pub fn new(title: impl Into<String>, url: impl Into<String>, source_page: u32) -> Self {
        Self {
            title: title.into(),
            price_text: None,
            rating_text: None,
            url: url.into(),
            source_page,
        }
    }

    /// Sets the raw price text.
    pub fn with_price_text(mut self, price_text: impl Into<String>) -> Self {
        self.price_text = Some(price_text.into());
        self
    }

    /// Sets the raw rating text.
    pub fn with_rating_text(mut self, rating_text: impl Into<String>) -> Self {
        self.rating_text = Some(rating_text.into());
        self
    }
}

/// A validated product record, the cache-eligible unit of the pipeline.
///
/// Immutable once created. Within a result set, titles are unique under
/// [`normalized_title`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Full product title (non-empty).
    pub title: String,
    /// Price, if it could be parsed (non-negative, 2 decimals).
    pub price: Option<f64>,
    /// Star rating in [0, 5], if it could be parsed (1 decimal).
    pub rating: Option<f64>,
    /// Absolute product URL.
    pub url: String,
    /// Source platform identifier.
    pub platform: String,
    /// UTC timestamp of when the record was normalized.
    pub scraped_at: DateTime<Utc>,
}

impl Product {
    /// Returns the dedup key for this product's title.
    pub fn normalized_title(&self) -> String {
        normalized_title(&self.title)
    }
}

/// Case-folds and collapses whitespace, for title dedup keys.
pub fn normalized_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The outcome of one search request: an ordered product set plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The search query as received.
    pub query: String,
    /// Products in first-seen order.
    pub products: Vec<Product>,
    /// When this result set was computed.
    pub created_at: DateTime<Utc>,
    /// Whether the result was served from the cache store.
    pub cached: bool,
}

impl QueryResult {
    /// Creates a freshly computed (uncached) result.
    pub fn new(query: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            query: query.into(),
            products,
            created_at: Utc::now(),
            cached: false,
        }
    }

    /// Returns the number of products in the result.
    pub fn count(&self) -> usize {
        self.products.len()
    }
}
