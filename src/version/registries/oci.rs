//! OCI Distribution tag list registry implementation

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::{RegistryError, Stage};
use crate::version::reference::RepositoryReference;
use crate::version::registries::auth::get_token;
use crate::version::registry::Registry;

/// Response from `GET /v2/{name}/tags/list`
#[derive(Debug, Deserialize)]
struct TagListResponse {
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Registry implementation speaking the OCI Distribution API with
/// anonymous pull tokens
pub struct OciRegistry {
    client: reqwest::Client,
    scheme: &'static str,
}

impl OciRegistry {
    /// Creates a new OciRegistry whose requests each complete within `timeout`
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(RegistryError::HttpClient)?;

        Ok(Self {
            client,
            scheme: "https",
        })
    }

    /// Talks plain HTTP instead of HTTPS. Only meant for local test registries.
    pub fn with_plain_http(mut self) -> Self {
        self.scheme = "http";
        self
    }
}

#[async_trait::async_trait]
impl Registry for OciRegistry {
    async fn fetch_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let reference = RepositoryReference::parse(repository)?;
        let token = get_token(&self.client, self.scheme, &reference.host, &reference.name).await?;

        let url = format!(
            "{}://{}/v2/{}/tags/list",
            self.scheme, reference.host, reference.name
        );
        debug!("Fetching tags from {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RegistryError::from_reqwest(Stage::TagList, &url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Registry returned status {}: {}", status, url);
            return Err(RegistryError::UnexpectedStatus {
                stage: Stage::TagList,
                status,
                url,
            });
        }

        let tag_list: TagListResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse tag list response: {}", e);
            RegistryError::from_reqwest(Stage::TagList, &url, e)
        })?;

        Ok(tag_list.tags.unwrap_or_default())
    }
}
