//! SQLite-backed Fund Catalog.

mod model;
mod repository;

pub use model::FundDB;
pub use repository::FundCatalogRepository;
