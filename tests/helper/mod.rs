//! Shared test utilities

pub mod registry;

pub use registry::{FakeRegistry, resolver_for};
