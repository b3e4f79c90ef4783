//! Anonymous bearer-token handshake for OCI registries
//!
//! Registries that require auth answer the `/v2/` probe with `401` and a
//! `WWW-Authenticate: Bearer realm="...",service="..."` challenge. The realm
//! hands out a pull-scoped token without credentials for public images.

use reqwest::StatusCode;
use reqwest::header::WWW_AUTHENTICATE;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::{RegistryError, Stage};

/// Parsed `WWW-Authenticate` bearer challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub realm: String,
    pub service: Option<String>,
    pub scope: Option<String>,
}

/// Response from the token endpoint
///
/// Docker's token auth protocol allows either `token` or `access_token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Parses a `Bearer realm="...",service="..."[,scope="..."]` challenge.
///
/// `host` is only used for error context.
pub fn parse_auth_challenge(host: &str, header: &str) -> Result<AuthChallenge, RegistryError> {
    let params = header.trim().strip_prefix("Bearer ").ok_or_else(|| {
        RegistryError::AuthChallenge {
            host: host.to_string(),
            message: format!("unsupported challenge scheme: {header}"),
        }
    })?;

    let mut realm = None;
    let mut service = None;
    let mut scope = None;

    for part in params.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim() {
            "realm" => realm = Some(value),
            "service" => service = Some(value),
            "scope" => scope = Some(value),
            _ => {}
        }
    }

    let realm = realm
        .filter(|r| !r.is_empty())
        .ok_or_else(|| RegistryError::AuthChallenge {
            host: host.to_string(),
            message: format!("challenge has no realm: {header}"),
        })?;

    Ok(AuthChallenge {
        realm,
        service,
        scope,
    })
}

/// Obtains an anonymous pull token for `name` on `host`.
///
/// Returns `Ok(None)` when the registry serves `/v2/` without auth.
pub async fn get_token(
    client: &reqwest::Client,
    scheme: &str,
    host: &str,
    name: &str,
) -> Result<Option<String>, RegistryError> {
    let probe_url = format!("{}://{}/v2/", scheme, host);
    debug!("Probing registry {}", probe_url);

    let response = client
        .get(&probe_url)
        .send()
        .await
        .map_err(|e| RegistryError::from_reqwest(Stage::Probe, &probe_url, e))?;

    match response.status() {
        StatusCode::OK => {
            debug!("Registry {} does not require auth", host);
            return Ok(None);
        }
        StatusCode::UNAUTHORIZED => {}
        status => {
            warn!("Registry probe returned status {}: {}", status, probe_url);
            return Err(RegistryError::UnexpectedStatus {
                stage: Stage::Probe,
                status,
                url: probe_url,
            });
        }
    }

    let header = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| RegistryError::AuthChallenge {
            host: host.to_string(),
            message: "401 without a readable WWW-Authenticate header".to_string(),
        })?;
    let challenge = parse_auth_challenge(host, header)?;

    fetch_token(client, host, name, &challenge).await
}

async fn fetch_token(
    client: &reqwest::Client,
    host: &str,
    name: &str,
    challenge: &AuthChallenge,
) -> Result<Option<String>, RegistryError> {
    let mut params = vec![("scope", format!("repository:{}:pull", name))];
    if let Some(service) = &challenge.service {
        params.push(("service", service.clone()));
    }
    let token_url = reqwest::Url::parse_with_params(&challenge.realm, &params).map_err(|e| {
        RegistryError::AuthChallenge {
            host: host.to_string(),
            message: format!("invalid realm {}: {}", challenge.realm, e),
        }
    })?;
    let token_url_str = token_url.to_string();
    debug!("Requesting anonymous token from {}", token_url_str);

    let response = client
        .get(token_url)
        .send()
        .await
        .map_err(|e| RegistryError::from_reqwest(Stage::Token, &token_url_str, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!("Token endpoint returned status {}: {}", status, token_url_str);
        return Err(RegistryError::UnexpectedStatus {
            stage: Stage::Token,
            status,
            url: token_url_str,
        });
    }

    let body: TokenResponse = response.json().await.map_err(|e| {
        warn!("Failed to parse token response: {}", e);
        RegistryError::from_reqwest(Stage::Token, &token_url_str, e)
    })?;

    let token = body
        .token
        .filter(|t| !t.is_empty())
        .or(body.access_token.filter(|t| !t.is_empty()));
    if token.is_none() {
        warn!("Token endpoint {} returned no token", token_url_str);
    }

    Ok(token)
}
