//! Registry test utilities

use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};

use oci_tag_resolver::SemverResolver;
use oci_tag_resolver::version::registries::OciRegistry;

/// mockito-backed registry speaking the `/v2/` handshake and tag list endpoints
pub struct FakeRegistry {
    pub server: ServerGuard,
}

impl FakeRegistry {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// Registry that answers `/v2/` with 200, i.e. needs no token
    pub async fn open() -> Self {
        let mut registry = Self::new().await;
        registry
            .server
            .mock("GET", "/v2/")
            .with_status(200)
            .create_async()
            .await;
        registry
    }

    /// Registry that challenges `/v2/` and issues `token` from its own realm
    pub async fn with_anonymous_auth(token: &str) -> Self {
        let mut registry = Self::new().await;
        let realm = format!("{}/token", registry.server.url());
        registry
            .server
            .mock("GET", "/v2/")
            .with_status(401)
            .with_header(
                "www-authenticate",
                &format!(r#"Bearer realm="{}",service="fake.registry""#, realm),
            )
            .create_async()
            .await;
        registry
            .server
            .mock("GET", "/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"token": "{}"}}"#, token))
            .create_async()
            .await;
        registry
    }

    /// Serve `tags` for repository `name`, expecting exactly `hits` requests
    pub async fn mock_tags(&mut self, name: &str, tags: &[&str], hits: usize) -> Mock {
        let body = serde_json::json!({ "name": name, "tags": tags }).to_string();
        self.server
            .mock("GET", format!("/v2/{}/tags/list", name).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// `host:port/name` reference pointing at this registry
    pub fn repository(&self, name: &str) -> String {
        format!("{}/{}", self.server.host_with_port(), name)
    }
}

/// Resolver using the real OCI registry client over plain HTTP
pub fn resolver_for(cache_ttl: Duration, timeout: Duration) -> SemverResolver {
    let registry = OciRegistry::new(timeout, "oci-tag-resolver-test")
        .unwrap()
        .with_plain_http();
    SemverResolver::new(Arc::new(registry), cache_ttl)
}
