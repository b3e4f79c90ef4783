use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Tag list fetched for one repository
#[derive(Debug, Clone)]
struct CacheEntry {
    tags: Vec<String>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// In-memory tag cache keyed by `host/name`
///
/// Entries are replaced wholesale on a successful fetch and never evicted.
/// A failed fetch leaves the previous entry (if any) untouched.
pub struct TagCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TagCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached tags for `repository`, fetching them from
    /// `registry` when missing or older than the TTL
    pub async fn get_tags(
        &self,
        registry: &dyn Registry,
        repository: &str,
    ) -> Result<Vec<String>, RegistryError> {
        if let Some(tags) = self.get_fresh(repository) {
            debug!("Cache hit for {} ({} tags)", repository, tags.len());
            return Ok(tags);
        }

        debug!("Cache miss for {}, fetching tags", repository);
        let tags = registry.fetch_tags(repository).await?;

        info!("Fetched {} tags for {}", tags.len(), repository);
        self.replace(repository, tags.clone());

        Ok(tags)
    }

    fn get_fresh(&self, repository: &str) -> Option<Vec<String>> {
        // Entries are plain data replaced in one insert, so a poisoned lock
        // still guards a consistent map.
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(repository)
            .filter(|entry| entry.is_fresh(self.ttl, Instant::now()))
            .map(|entry| entry.tags.clone())
    }

    fn replace(&self, repository: &str, tags: Vec<String>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            repository.to_string(),
            CacheEntry {
                tags,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Number of repositories with a cached tag list (fresh or stale)
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
