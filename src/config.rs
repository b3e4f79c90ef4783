use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

// =============================================================================
// Defaults
// =============================================================================

/// Default cache TTL in seconds (1 hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

/// Timeout for a single registry request in seconds, covering connect,
/// TLS handshake and body read
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("oci-tag-resolver/", env!("CARGO_PKG_VERSION"));

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Cache TTL in seconds
    pub cache_ttl: u64,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    pub user_agent: String,
    /// Use http:// instead of https:// (local test registries only)
    pub plain_http: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            plain_http: false,
        }
    }
}

impl ResolverConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Load a JSON config file. Missing fields fall back to defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ResolverConfig> {
    let path = path.as_ref();
    info!("Loading config from file {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Returns the path to the config directory for oci-tag-resolver.
/// Uses $XDG_CONFIG_HOME/oci-tag-resolver if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/oci-tag-resolver,
/// or ./oci-tag-resolver if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("oci-tag-resolver")
}
