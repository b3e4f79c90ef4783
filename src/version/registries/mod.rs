//! Registry implementations for fetching image tags

pub mod auth;
pub mod oci;

pub use oci::OciRegistry;
