//! Latest stable version resolution for image repositories
//!
//! Ties the tag cache, the registry and the semver selector together:
//! cached tags (or a fresh fetch on miss) are filtered down to stable,
//! constraint-satisfying versions and the highest original tag is returned.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ResolverConfig;
use crate::version::cache::TagCache;
use crate::version::error::RegistryError;
use crate::version::registries::OciRegistry;
use crate::version::registry::Registry;
use crate::version::semver::{VersionConstraint, select_latest};

/// Resolves floating tags to the highest stable semver tag of a repository
///
/// The tag cache belongs to the instance, so independently configured
/// resolvers never share entries. Share one resolver behind `Arc` between
/// tasks to share its cache.
pub struct SemverResolver {
    registry: Arc<dyn Registry>,
    cache: TagCache,
}

impl SemverResolver {
    /// Create a resolver over any registry implementation
    pub fn new(registry: Arc<dyn Registry>, cache_ttl: Duration) -> Self {
        Self {
            registry,
            cache: TagCache::new(cache_ttl),
        }
    }

    /// Create a resolver talking to OCI registries as described by `config`
    pub fn from_config(config: &ResolverConfig) -> Result<Self, RegistryError> {
        let mut registry = OciRegistry::new(config.request_timeout(), &config.user_agent)?;
        if config.plain_http {
            registry = registry.with_plain_http();
        }
        Ok(Self::new(Arc::new(registry), config.cache_ttl()))
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    /// Return the highest stable tag of `repository` that satisfies `constraint`
    ///
    /// # Arguments
    /// * `repository` - `host/name` reference (e.g., "ghcr.io/openclaw/openclaw")
    /// * `constraint` - Optional predicate every candidate version must pass
    ///
    /// # Returns
    /// * `Ok(String)` - The winning tag exactly as the registry lists it ("v2.0.0" stays "v2.0.0")
    /// * `Err(RegistryError::NoStableVersion)` - No stable tag passed the filters
    /// * `Err(RegistryError)` - Reference, handshake or tag list failures
    pub async fn latest_semver(
        &self,
        repository: &str,
        constraint: Option<&dyn VersionConstraint>,
    ) -> Result<String, RegistryError> {
        let tags = self.cache.get_tags(self.registry.as_ref(), repository).await?;

        let latest = select_latest(&tags, constraint).ok_or_else(|| {
            RegistryError::NoStableVersion {
                repository: repository.to_string(),
            }
        })?;

        info!("Resolved {} to {}", repository, latest);
        Ok(latest.to_string())
    }
}
