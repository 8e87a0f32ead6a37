//! Durable query-result cache keyed by normalized query text.
//!
//! At most one entry is current per query key. Writes replace the prior
//! entry wholesale rather than merging, so stale and fresh data never mix.
//! The TTL check uses the creation timestamp embedded in the entry body,
//! not file metadata, so entries survive storage migration.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Product, QueryResult, Result, ScrapeError};

/// Derives the cache key for a query: lower-cased, trimmed, whitespace
/// collapsed to underscores.
///
/// ```
/// use dealscope::cache::query_key;
///
/// assert_eq!(query_key("  Sony   Headphones "), "sony_headphones");
/// ```
pub fn query_key(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Storage interface for query results.
///
/// The orchestrator takes this as an injected capability so tests can use
/// doubles and concurrent queries stay isolated per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the current entry for the query if it is younger than the
    /// configured TTL. Absent or expired entries yield `None`.
    async fn get(&self, query: &str) -> Result<Option<QueryResult>>;

    /// Writes a new current entry for the query, atomically superseding any
    /// prior entry for the same key.
    async fn put(&self, query: &str, products: &[Product]) -> Result<()>;
}

/// Persisted form of a query result.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    query: String,
    created_at: DateTime<Utc>,
    products: Vec<Product>,
}

/// File-backed cache store: one JSON file per current entry, named
/// `{key}_{YYYYmmdd_HHMMSS}.json`.
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Creates a cache over `dir` with the given TTL in hours. The
    /// directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: i64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Lists entry files for a key, newest first. The embedded timestamp
    /// sorts lexicographically, so filename order is creation order.
    async fn entries_for(&self, key: &str) -> Result<Vec<PathBuf>> {
        let mut names: Vec<String> = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry_key(&name) == Some(key) {
                names.push(name);
            }
        }
        names.sort();
        names.reverse();
        Ok(names.into_iter().map(|n| self.dir.join(n)).collect())
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, query: &str) -> Result<Option<QueryResult>> {
        let key = query_key(query);
        let Some(path) = self.entries_for(&key).await?.into_iter().next() else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(&path).await?;
        let entry: CacheEntry = serde_json::from_slice(&bytes)
            .map_err(|e| ScrapeError::Cache(format!("corrupt entry {}: {e}", path.display())))?;

        let age = Utc::now() - entry.created_at;
        if age > self.ttl {
            debug!(%key, age_hours = age.num_hours(), "cache entry expired");
            return Ok(None);
        }

        debug!(%key, count = entry.products.len(), "cache hit");
        Ok(Some(QueryResult {
            query: entry.query,
            products: entry.products,
            created_at: entry.created_at,
            cached: true,
        }))
    }

    async fn put(&self, query: &str, products: &[Product]) -> Result<()> {
        let key = query_key(query);
        let entry = CacheEntry {
            query: query.to_string(),
            created_at: Utc::now(),
            products: products.to_vec(),
        };

        tokio::fs::create_dir_all(&self.dir).await?;

        let previous = self.entries_for(&key).await?;

        let file_name = format!("{key}_{}.json", entry.created_at.format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(&file_name);
        let body = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ScrapeError::Cache(format!("serialize entry: {e}")))?;

        // Write-then-rename keeps a half-written entry from ever being
        // visible under the final name.
        let tmp = self.dir.join(format!(".tmp-{file_name}"));
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        // The new entry is durable; prior entries for this key are now
        // superseded and removed.
        for old in previous {
            if old != path {
                if let Err(e) = tokio::fs::remove_file(&old).await {
                    warn!(path = %old.display(), error = %e, "failed to remove superseded entry");
                }
            }
        }

        debug!(%key, count = entry.products.len(), "cache entry written");
        Ok(())
    }
}

/// Recovers the query key from an entry file name of the form
/// `{key}_{YYYYmmdd}_{HHMMSS}.json`. Returns `None` for anything else.
fn entry_key(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".json")?;
    let (rest, hms) = stem.rsplit_once('_')?;
    let (key, ymd) = rest.rsplit_once('_')?;
    let is_stamp = ymd.len() == 8
        && hms.len() == 6
        && ymd.chars().all(|c| c.is_ascii_digit())
        && hms.chars().all(|c| c.is_ascii_digit());
    if is_stamp && !key.is_empty() {
        Some(key)
    } else {
        None
    }
}

/// Writes an entry with a forged creation time. Test-only hook for
/// exercising the TTL boundary without waiting.
#[cfg(test)]
async fn put_with_created_at(
    cache: &FileCache,
    query: &str,
    products: &[Product],
    created_at: DateTime<Utc>,
) -> Result<()> {
    let key = query_key(query);
    let entry = CacheEntry {
        query: query.to_string(),
        created_at,
        products: products.to_vec(),
    };
    tokio::fs::create_dir_all(&cache.dir).await?;
    let file_name = format!("{key}_{}.json", created_at.format("%Y%m%d_%H%M%S"));
    let body = serde_json::to_vec_pretty(&entry).expect("entry serializes");
    tokio::fs::write(cache.dir.join(file_name), body).await?;
    Ok(())
}
