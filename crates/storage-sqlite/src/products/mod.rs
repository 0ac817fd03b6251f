//! SQLite-backed Product Registry.

mod model;
mod repository;

pub use model::ProductDB;
pub use repository::ProductRegistryRepository;
