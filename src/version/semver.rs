use std::cmp::Ordering;

use semver::{Version, VersionReq};
use tracing::debug;

/// Caller-supplied predicate over parsed versions
///
/// Implemented for [`VersionReq`], so `">=1.0.0, <2.0.0"` can be used directly.
pub trait VersionConstraint: Send + Sync {
    fn allows(&self, version: &Version) -> bool;
}

impl VersionConstraint for VersionReq {
    fn allows(&self, version: &Version) -> bool {
        self.matches(version)
    }
}

/// Parse an image tag into a semver::Version.
///
/// Strips a single leading `v` and pads partial versions like "1" or "1.2"
/// with zeros. Tags such as "latest" or "main" return None.
///
/// Examples:
/// - "v1.2.3" -> Version(1, 2, 3)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3-rc.1" -> Version(1, 2, 3, pre: rc.1)
/// - "1.2+build.1" -> Version(1, 2, 0, build: build.1)
pub fn parse_tag(tag: &str) -> Option<Version> {
    let version = tag.strip_prefix('v').unwrap_or(tag);
    // Only the numeric core is padded; prerelease and build keep their dots
    let core_end = version
        .find(|c| c == '-' || c == '+')
        .unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    let normalized = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, suffix),
        2 => format!("{}.0{}", core, suffix),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// SemVer precedence: build metadata does not take part
fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Select the highest stable tag, optionally restricted by `constraint`
///
/// Unparseable and prerelease tags are skipped. Tags with equal precedence
/// (e.g. `1.0.0` and `v1.0.0`, or differing build metadata) are ordered by
/// their raw string, the greater one wins.
///
/// Returns the original tag string, not a normalized rendering.
pub fn select_latest<'a>(
    tags: &'a [String],
    constraint: Option<&dyn VersionConstraint>,
) -> Option<&'a str> {
    tags.iter()
        .filter_map(|tag| match parse_tag(tag) {
            Some(version) => Some((tag.as_str(), version)),
            None => {
                debug!("Skipping non-semver tag {}", tag);
                None
            }
        })
        .filter(|(tag, version)| {
            if !version.pre.is_empty() {
                debug!("Skipping prerelease tag {}", tag);
                return false;
            }
            true
        })
        .filter(|(_, version)| constraint.is_none_or(|c| c.allows(version)))
        .max_by(|(tag_a, a), (tag_b, b)| cmp_precedence(a, b).then_with(|| tag_a.cmp(tag_b)))
        .map(|(tag, _)| tag)
}
