use std::fmt;

use thiserror::Error;

/// Step of the registry exchange an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unauthenticated `GET /v2/` probe
    Probe,
    /// Anonymous token request against the challenge realm
    Token,
    /// `GET /v2/{name}/tags/list`
    TagList,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Probe => "registry probe",
            Stage::Token => "token request",
            Stage::TagList => "tag list",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid repository reference {reference:?}: {reason}")]
    InvalidReference {
        reference: String,
        reason: &'static str,
    },

    #[error("Invalid auth challenge from {host}: {message}")]
    AuthChallenge { host: String, message: String },

    #[error("{stage} returned unexpected status {status}: {url}")]
    UnexpectedStatus {
        stage: Stage,
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("{stage} request to {url} failed: {source}")]
    Transport {
        stage: Stage,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode {stage} response from {url}: {source}")]
    Decode {
        stage: Stage,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("no stable semver tags found in {repository}")]
    NoStableVersion { repository: String },
}

impl RegistryError {
    /// Classifies a reqwest failure: body decoding problems become `Decode`,
    /// everything else (DNS, TLS, connect, timeout) is `Transport`.
    pub(crate) fn from_reqwest(stage: Stage, url: &str, source: reqwest::Error) -> Self {
        if source.is_decode() {
            RegistryError::Decode {
                stage,
                url: url.to_string(),
                source,
            }
        } else {
            RegistryError::Transport {
                stage,
                url: url.to_string(),
                source,
            }
        }
    }
}
