//! Pipeline configuration.
//!
//! Read once at orchestrator construction and immutable for the process
//! lifetime. `MAX_PAGES` and `CACHE_TTL_HOURS` can be overridden from the
//! environment, matching the deployment surface of the dashboard stack.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the scraping pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing source root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Platform identifier stamped on every product.
    #[serde(default = "default_platform")]
    pub platform: String,
    /// User-agent sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum result pages fetched per query.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Cache entry time-to-live in hours.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,
    /// Per-page fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Minimum inter-page delay in milliseconds.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Maximum inter-page delay in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Directory holding cache entry files.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_base_url() -> String {
    "https://www.amazon.in".to_string()
}

fn default_platform() -> String {
    "Amazon".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_max_pages() -> u32 {
    3
}

fn default_cache_ttl_hours() -> i64 {
    24
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_min_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    4000
}

fn default_cache_dir() -> String {
    "data/processed".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            platform: default_platform(),
            user_agent: default_user_agent(),
            max_pages: default_max_pages(),
            cache_ttl_hours: default_cache_ttl_hours(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl Config {
    /// Builds a config from defaults plus the `MAX_PAGES` and
    /// `CACHE_TTL_HOURS` environment variables. Unparsable values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("MAX_PAGES") {
            match value.parse() {
                Ok(n) => config.max_pages = n,
                Err(_) => warn!(%value, "ignoring unparsable MAX_PAGES"),
            }
        }
        if let Ok(value) = std::env::var("CACHE_TTL_HOURS") {
            match value.parse() {
                Ok(n) => config.cache_ttl_hours = n,
                Err(_) => warn!(%value, "ignoring unparsable CACHE_TTL_HOURS"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.amazon.in");
        assert_eq!(config.platform, "Amazon");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.min_delay_ms, 2000);
        assert_eq!(config.max_delay_ms, 4000);
        assert_eq!(config.cache_dir, "data/processed");
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let json = r#"{"max_pages": 5}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.platform, "Amazon");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"max_pages\":3"));
        assert!(json.contains("\"cache_ttl_hours\":24"));
    }
}
