//! On-disk cache of raw export pages.
//!
//! One JSON file per (endpoint, topic, page) under a cache root, grouped in a
//! subdirectory per endpoint. Entries never expire; they are bypassed with a
//! forced refresh or removed with [`ResponseCache::clear`].

use crate::client::ScivalClient;
use crate::endpoint::EndpointKind;
use crate::error::{ScivalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory name under the platform cache directory
const CACHE_DIR_NAME: &str = "rustscival";

/// Identifies one cached export page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: EndpointKind,
    pub topic_id: String,
    pub page: u32,
}

impl CacheKey {
    pub fn new(endpoint: EndpointKind, topic_id: impl Into<String>, page: u32) -> Self {
        Self {
            endpoint,
            topic_id: topic_id.into(),
            page,
        }
    }

    /// File name of this entry inside its endpoint directory.
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct topic
    /// ids never share a file.
    fn file_name(&self) -> String {
        let mut topic = String::with_capacity(self.topic_id.len());
        for b in self.topic_id.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                topic.push(char::from(b));
            } else {
                topic.push_str(&format!("%{:02X}", b));
            }
        }
        format!("{}_page{}.json", topic, self.page)
    }
}

/// Serialized form of a cached page
#[derive(Debug, Serialize, Deserialize)]
struct CachedPage {
    endpoint: EndpointKind,
    topic_id: String,
    page: u32,
    fetched_at: String,
    body: String,
}

impl CachedPage {
    fn matches(&self, key: &CacheKey) -> bool {
        self.endpoint == key.endpoint && self.topic_id == key.topic_id && self.page == key.page
    }
}

/// Read-through/write-through cache of decoded export pages
#[derive(Debug, Clone)]
pub struct ResponseCache {
    root: PathBuf,
}

impl ResponseCache {
    /// Create a cache rooted at `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default cache root: `<platform cache dir>/rustscival`
    pub fn default_root() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|p| p.join(CACHE_DIR_NAME))
            .ok_or_else(|| ScivalError::Config("Cannot determine cache directory".to_string()))
    }

    /// Get the cache root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// File backing `key`
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.endpoint.as_str()).join(key.file_name())
    }

    /// Cached body for `key`.
    ///
    /// Returns `None` if the entry doesn't exist or can't be read.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            debug!(path = ?path, "Cache miss");
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CachedPage>(&content) {
                Ok(entry) if entry.matches(key) => {
                    debug!(path = ?path, fetched_at = %entry.fetched_at, "Cache hit");
                    Some(entry.body)
                }
                Ok(entry) => {
                    warn!(
                        path = ?path,
                        endpoint = %entry.endpoint,
                        topic = %entry.topic_id,
                        page = entry.page,
                        "Cache entry belongs to another page"
                    );
                    None
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to parse cache entry");
                    None
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    /// Store `body` under `key`, replacing any previous entry
    pub fn put(&self, key: &CacheKey, body: &str) -> Result<()> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entry = CachedPage {
            endpoint: key.endpoint,
            topic_id: key.topic_id.clone(),
            page: key.page,
            fetched_at: chrono::Utc::now().to_rfc3339(),
            body: body.to_string(),
        };
        std::fs::write(&path, serde_json::to_string(&entry)?)?;
        debug!(path = ?path, bytes = body.len(), "Stored cache entry");
        Ok(())
    }

    /// Return the cached page, or fetch it and store the result.
    ///
    /// With `force_refresh` the cache is not read, but the fresh page still
    /// overwrites the entry. A failed write is logged and the page returned.
    pub async fn fetch_with_cache(
        &self,
        client: &ScivalClient,
        key: &CacheKey,
        force_refresh: bool,
    ) -> Result<String> {
        if !force_refresh {
            if let Some(body) = self.get(key) {
                return Ok(body);
            }
        }

        let body = client.fetch(&key.topic_id, key.endpoint, key.page).await?;
        if let Err(e) = self.put(key, &body) {
            warn!(path = ?self.entry_path(key), error = %e, "Failed to store cache entry");
        }
        Ok(body)
    }

    /// Remove every cached page for one endpoint
    pub fn clear_endpoint(&self, endpoint: EndpointKind) -> Result<()> {
        let dir = self.root.join(endpoint.as_str());
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            info!("Cleared {} cache at {:?}", endpoint, dir);
        }
        Ok(())
    }

    /// Remove the whole cache
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
            info!("Cleared cache at {:?}", self.root);
        }
        Ok(())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Self::default_root().unwrap_or_else(|_| PathBuf::from(".rustscival-cache")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing() {
        let cache = ResponseCache::new("/nonexistent/path");
        assert!(cache.get(&CacheKey::new(EndpointKind::Publications, "1", 1)).is_none());
    }

    #[test]
    fn test_put_and_get() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = ResponseCache::new(dir.path());
        let key = CacheKey::new(EndpointKind::Publications, "1234", 2);

        cache.put(&key, "Data set,Scopus\n\"Title\"\n")?;
        assert_eq!(cache.get(&key).as_deref(), Some("Data set,Scopus\n\"Title\"\n"));
        assert_eq!(
            cache.entry_path(&key),
            dir.path().join("publications").join("1234_page2.json")
        );

        // Other pages and endpoints are separate entries
        assert!(cache.get(&CacheKey::new(EndpointKind::Publications, "1234", 1)).is_none());
        assert!(cache.get(&CacheKey::new(EndpointKind::RelatedTopics, "1234", 2)).is_none());
        Ok(())
    }

    #[test]
    fn test_put_overwrites() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = ResponseCache::new(dir.path());
        let key = CacheKey::new(EndpointKind::RelatedTopics, "77", 1);

        cache.put(&key, "old")?;
        cache.put(&key, "new")?;
        assert_eq!(cache.get(&key).as_deref(), Some("new"));
        Ok(())
    }

    #[test]
    fn test_corrupt_entry_is_miss() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = ResponseCache::new(dir.path());
        let key = CacheKey::new(EndpointKind::Publications, "9", 1);

        let path = cache.entry_path(&key);
        std::fs::create_dir_all(path.parent().expect("entry has a parent"))?;
        std::fs::write(&path, "not json")?;
        assert!(cache.get(&key).is_none());
        Ok(())
    }

    #[test]
    fn test_topic_id_is_encoded() {
        let cache = ResponseCache::new("/cache");
        let key = CacheKey::new(EndpointKind::Publications, "../T.12/3", 1);
        assert_eq!(
            cache.entry_path(&key),
            PathBuf::from("/cache/publications/%2E%2E%2FT%2E12%2F3_page1.json")
        );

        let key = CacheKey::new(EndpointKind::Publications, "Thème 5", 1);
        assert_eq!(key.file_name(), "Th%C3%A8me%205_page1.json");
    }

    #[test]
    fn test_similar_topic_ids_do_not_collide() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = ResponseCache::new(dir.path());
        let dotted = CacheKey::new(EndpointKind::Publications, "1.2", 1);
        let underscored = CacheKey::new(EndpointKind::Publications, "1_2", 1);
        assert_ne!(cache.entry_path(&dotted), cache.entry_path(&underscored));

        cache.put(&dotted, "body for 1.2")?;
        assert!(cache.get(&underscored).is_none());

        cache.put(&underscored, "body for 1_2")?;
        assert_eq!(cache.get(&dotted).as_deref(), Some("body for 1.2"));
        assert_eq!(cache.get(&underscored).as_deref(), Some("body for 1_2"));
        Ok(())
    }

    #[test]
    fn test_entry_for_another_key_is_miss() -> Result<()> {
        let dir = TempDir::new()?;
        let cache = ResponseCache::new(dir.path());
        let key = CacheKey::new(EndpointKind::Publications, "1234", 1);
        let other = CacheKey::new(EndpointKind::Publications, "5678", 3);

        // Entry written for `other`, then found at `key`'s path
        cache.put(&other, "someone else's page")?;
        let path = cache.entry_path(&key);
        std::fs::create_dir_all(path.parent().expect("entry has a parent"))?;
        std::fs::copy(cache.entry_path(&other), &path)?;

        assert!(cache.get(&key).is_none());
        assert_eq!(cache.get(&other).as_deref(), Some("someone else's page"));
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let dir = TempDir::new()?;
        let root = dir.path().join("cache");
        let cache = ResponseCache::new(&root);
        let papers = CacheKey::new(EndpointKind::Publications, "1", 1);
        let topics = CacheKey::new(EndpointKind::RelatedTopics, "1", 1);
        cache.put(&papers, "a")?;
        cache.put(&topics, "b")?;

        cache.clear_endpoint(EndpointKind::Publications)?;
        assert!(cache.get(&papers).is_none());
        assert_eq!(cache.get(&topics).as_deref(), Some("b"));

        cache.clear()?;
        assert!(!root.exists());
        // Clearing twice is fine
        cache.clear()?;
        Ok(())
    }
}
