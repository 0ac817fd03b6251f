//! Modelfolio Core - Portfolio template versioning.
//!
//! Templates are reusable fund-allocation blueprints. Each template owns an
//! ordered series of generations; products bind to exactly one generation.
//! This crate holds the rules around that model:
//! - `templates`: templates, generations and allocation sets
//! - `risk`: weighted risk of an allocation set
//! - `lifecycle`: draft/active/archived transitions, one active per template
//! - `references`: bound-product counts that gate deletes
//! - `migration`: products still pinned to non-current generations
//!
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate. The Fund Catalog and Product Registry are external
//! collaborators reached through `funds::FundCatalogTrait` and
//! `products::ProductRegistryTrait`.

pub mod config;
pub mod constants;
pub mod errors;
pub mod funds;
pub mod lifecycle;
pub mod migration;
pub mod products;
pub mod references;
pub mod risk;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::VersioningConfig;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
