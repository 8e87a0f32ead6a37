//! Error types for the scraping pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors that can occur while scraping, caching, or serving listings.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A single result page could not be retrieved.
    #[error("Failed to fetch page {page}: {reason}")]
    Fetch { page: u32, reason: String },

    /// Every configured page fetch failed; the source is unreachable.
    #[error("All {0} page fetches failed, source unreachable")]
    TotalFetchFailure(u32),

    /// Failed to parse page markup.
    #[error("Failed to parse markup: {0}")]
    Parse(String),

    /// Invalid search query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid request parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Cache storage read/write failure.
    #[error("Cache error: {0}")]
    Cache(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
