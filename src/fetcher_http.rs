//! HTTP-based page fetcher using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::fetcher::PageFetcher;
use crate::{Result, ScrapeError};

/// A page fetcher that retrieves server-rendered listing pages over plain
/// HTTP.
///
/// Sends a realistic desktop user-agent and locale headers; sources block
/// obvious bot traffic. Pages that require JavaScript rendering need a
/// browser-backed fetcher behind the same [`PageFetcher`] trait.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` for the given listing source.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .gzip(true)
                .brotli(true)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/s?k={}&page={}",
            self.base_url,
            urlencoding::encode(query),
            page
        )
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, query: &str, page: u32) -> Result<String> {
        let url = self.page_url(query, page);
        debug!(%url, "fetching listing page");

        let response = self
            .client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-IN,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch {
                page,
                reason: format!("status {status}"),
            });
        }

        Ok(response.text().await?)
    }
}
