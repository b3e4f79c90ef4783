//! Registry trait for fetching image tags from remote sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching the tag list of a repository from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches all tags for a repository
    ///
    /// # Arguments
    /// * `repository` - `host/name` reference (e.g., "ghcr.io/openclaw/openclaw")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tags in the order the registry returned them
    /// * `Err(RegistryError)` - If the fetch fails
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;
}
