//! SQLite storage implementation for Modelfolio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the traits defined in `modelfolio-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The template repository (templates, generations, allocations)
//! - Fund Catalog and Product Registry adapters over local tables
//! - A durable migration note store
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core
//! crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! All writes go through a single writer actor ([`WriteHandle`]); each write
//! job is one immediate transaction. Reads use pooled connections.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod funds;
pub mod migration_notes;
pub mod products;
pub mod templates;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use funds::FundCatalogRepository;
pub use migration_notes::MigrationNoteRepository;
pub use products::ProductRegistryRepository;
pub use templates::TemplateRepository;

// Re-export from modelfolio-core for convenience
pub use modelfolio_core::errors::{DatabaseError, Error, Result};
