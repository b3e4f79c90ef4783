pub mod config;
pub mod version;

pub use version::error::RegistryError;
pub use version::resolver::SemverResolver;
pub use version::semver::VersionConstraint;
