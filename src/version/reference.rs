//! Repository reference parsing (`host/name`)

use std::fmt;

use crate::version::error::RegistryError;

/// A repository on a specific registry host, e.g. `ghcr.io` + `openclaw/openclaw`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub host: String,
    pub name: String,
}

impl RepositoryReference {
    /// Splits `repository` on the first `/` into host and repository name.
    ///
    /// Everything after the first slash is kept as the name, so
    /// `registry.example.com/org/repo/sub` has the name `org/repo/sub`.
    /// The host must contain a `.`, otherwise it cannot be told apart from
    /// a path segment of a Docker Hub short name.
    pub fn parse(repository: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &'static str| RegistryError::InvalidReference {
            reference: repository.to_string(),
            reason,
        };

        let (host, name) = repository
            .split_once('/')
            .ok_or_else(|| invalid("expected <host>/<name>"))?;

        if name.is_empty() {
            return Err(invalid("repository name is empty"));
        }
        if !host.contains('.') {
            return Err(invalid("registry host must contain a dot"));
        }

        Ok(Self {
            host: host.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.name)
    }
}

/// Convenience wrapper returning `(host, name)`
pub fn parse_repository(repository: &str) -> Result<(String, String), RegistryError> {
    RepositoryReference::parse(repository).map(|r| (r.host, r.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ghcr.io/openclaw/openclaw", "ghcr.io", "openclaw/openclaw")]
    #[case("docker.io/library/nginx", "docker.io", "library/nginx")]
    #[case(
        "registry.example.com/org/repo/sub",
        "registry.example.com",
        "org/repo/sub"
    )]
    #[case("127.0.0.1:5000/team/app", "127.0.0.1:5000", "team/app")]
    fn parse_splits_on_first_slash(
        #[case] input: &str,
        #[case] host: &str,
        #[case] name: &str,
    ) {
        assert_eq!(
            parse_repository(input).unwrap(),
            (host.to_string(), name.to_string())
        );
    }

    #[rstest]
    #[case("invalid")]
    #[case("noDot/repo")]
    #[case("localhost:5000/repo")]
    #[case("ghcr.io/")]
    #[case("")]
    fn parse_rejects_ambiguous_references(#[case] input: &str) {
        assert!(matches!(
            parse_repository(input),
            Err(RegistryError::InvalidReference { .. })
        ));
    }

    #[test]
    fn display_round_trips_to_cache_key() {
        let reference = RepositoryReference::parse("ghcr.io/openclaw/openclaw").unwrap();
        assert_eq!(reference.to_string(), "ghcr.io/openclaw/openclaw");
    }
}
