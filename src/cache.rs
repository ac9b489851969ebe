//! Response cache used by the registry client
//!
//! Entries are opaque strings keyed by request identity. Callers treat the
//! cache as best effort: a failed write is logged and otherwise ignored.

use crate::config::CacheConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Common interface for response caches
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Name of this cache (for logging)
    fn name(&self) -> &'static str;

    /// Cached value for `key`, if present and not expired
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Drop every entry
    async fn clear(&self) -> Result<()>;
}

/// Build the cache described by the configuration
pub fn from_config(config: &CacheConfig) -> Arc<dyn ResponseCache> {
    if config.enabled {
        Arc::new(DiskCache::new(config.resolved_directory()))
    } else {
        Arc::new(NoCache)
    }
}

/// Cache that never stores anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// In-process cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        Ok(())
    }
}

/// One JSON file per entry under a cache directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    directory: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    key: String,
    value: String,
    expires_at: DateTime<Utc>,
}

impl DiskCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Entry file named by the SHA-256 of the key
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.directory.join(format!("{:x}.json", hasher.finalize()))
    }
}

#[async_trait]
impl ResponseCache for DiskCache {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let content = tokio::fs::read_to_string(&path).await.ok()?;

        let entry: DiskEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        // Hash collisions and expired entries both read as a miss
        if entry.key != key || entry.expires_at <= Utc::now() {
            return None;
        }
        Some(entry.value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let entry = DiskEntry {
            key: key.to_string(),
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        };

        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.entry_path(key);
        tokio::fs::write(&path, serde_json::to_vec(&entry)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.directory).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_disk_cache_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("responses"));

        assert_eq!(cache.get("https://registry.npmjs.org/express").await, None);

        cache
            .set("https://registry.npmjs.org/express", "{\"name\":\"express\"}", HOUR)
            .await
            .unwrap();
        assert_eq!(
            cache.get("https://registry.npmjs.org/express").await.as_deref(),
            Some("{\"name\":\"express\"}")
        );
        assert_eq!(cache.get("https://registry.npmjs.org/koa").await, None);

        cache.clear().await.unwrap();
        assert_eq!(cache.get("https://registry.npmjs.org/express").await, None);
        assert!(!cache.directory().exists());
    }

    #[tokio::test]
    async fn test_disk_cache_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());

        cache.set("key", "value", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("key").await, None);
    }

    #[tokio::test]
    async fn test_disk_cache_ignores_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.set("key", "value", HOUR).await.unwrap();
        std::fs::write(cache.entry_path("key"), "garbage").unwrap();

        assert_eq!(cache.get("key").await, None);
    }

    #[test]
    fn test_entry_path_is_stable() {
        let cache = DiskCache::new("/tmp/dep-health");
        assert_eq!(
            cache.entry_path("https://registry.npmjs.org/express"),
            PathBuf::from("/tmp/dep-health")
                .join("2f577561a21addce0e0d139b9de2ad4be69d6703e4d457d5387ff6f6cf0422f9.json")
        );
    }

    #[tokio::test]
    async fn test_clear_missing_directory_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("never-created"));
        assert!(cache.clear().await.is_ok());
    }

    #[test]
    fn test_memory_cache() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new();
            cache.set("a", "1", HOUR).await.unwrap();
            cache.set("b", "2", Duration::ZERO).await.unwrap();

            assert_eq!(cache.get("a").await.as_deref(), Some("1"));
            assert_eq!(cache.get("b").await, None);
            assert_eq!(cache.len(), 2);

            cache.clear().await.unwrap();
            assert!(cache.is_empty());
        });
    }

    #[test]
    fn test_from_config() {
        let disabled = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert_eq!(from_config(&disabled).name(), "none");
        assert_eq!(from_config(&CacheConfig::default()).name(), "disk");
    }
}
