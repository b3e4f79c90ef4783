//! Version resolution layer for container image tags
//!
//! This module provides the core functionality for fetching, caching, and
//! selecting image tags from OCI Distribution registries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│    Cache    │────▶│  Registry   │
//! │ (select)    │     │   (TTL)     │     │  (fetch)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │   Semver    │                         │ Auth + OCI  │
//! │ (filter/max)│                         │ (handshake) │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: In-memory TTL cache of tag lists
//! - [`error`]: Error types for registry and resolution failures
//! - [`reference`]: `host/name` repository reference parsing
//! - [`registry`]: Registry trait for fetching tags from remote sources
//! - [`registries`]: OCI registry implementation and anonymous token handshake
//! - [`resolver`]: Latest stable version resolution
//! - [`semver`]: Tag parsing, constraints and selection

pub mod cache;
pub mod error;
pub mod reference;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
